//! Data models for identities, roles and account requests.

pub mod account;
pub mod identity;

pub use account::*;
pub use identity::*;
