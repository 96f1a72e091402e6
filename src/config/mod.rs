//! Application configuration loaded from environment.

use std::net::SocketAddr;

use crate::auth::JwtConfig;

const DEFAULT_PASSWORD_MIN_LENGTH: usize = 6;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3000`).
    pub server_addr: SocketAddr,
    /// PostgreSQL connection URL. When unset the in-memory store is used.
    pub database_url: Option<String>,
    /// Token signing secret, issuer and audience. All three are required.
    pub jwt: JwtConfig,
    /// Minimum password length enforced on registration.
    pub password_min_length: usize,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let jwt = JwtConfig::from_parts(
            lookup("JWT_SECRET"),
            lookup("JWT_ISSUER"),
            lookup("JWT_AUDIENCE"),
        )?;

        let password_min_length = match lookup("PASSWORD_MIN_LENGTH") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigLoadError::InvalidNumber("PASSWORD_MIN_LENGTH"))?,
            None => DEFAULT_PASSWORD_MIN_LENGTH,
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            database_url,
            jwt,
            password_min_length,
            log_level,
        })
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("{0} is not set in the configuration")]
    Missing(&'static str),
    #[error("{0} must be a non-negative integer")]
    InvalidNumber(&'static str),
}
