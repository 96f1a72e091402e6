//! Database layer: pool and the PostgreSQL identity repository.

mod pool;
mod repositories;

pub use pool::{create_pool, migrate, DbPool};
pub use repositories::*;
