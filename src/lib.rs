//! Username/password account service issuing HS256 JWT bearer tokens.
//!
//! Registration (plain, administrator and VIP variants) and login run
//! against a pluggable credential store: in-memory or PostgreSQL.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::{AccountService, CredentialStore};

use axum::routing::{get, post};
use handlers::http;
use tower_http::trace::TraceLayer;

/// Build the API router (account, health). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let account_routes = axum::Router::new()
        .route("/register", post(auth::register))
        .route("/register-admin", post(auth::register_admin))
        .route("/register-vip", post(auth::register_vip))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/api/account", account_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
