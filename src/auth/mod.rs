//! Authentication: password policy, JWT issuance, account handlers.

mod handlers;
mod jwt;
pub mod password;

pub use handlers::{login, me, register, register_admin, register_vip};
pub use jwt::{Claims, IssuedToken, JwtConfig, TokenIssuer, TOKEN_LIFETIME_SECS};
