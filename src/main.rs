//! Entry point: load config, wire dependencies, and run the server.

use authdemo::auth::{password::AccountPolicy, TokenIssuer};
use authdemo::config::Config;
use authdemo::db;
use authdemo::repositories::{InMemoryRepository, UserRepository};
use authdemo::services::{AccountService, CredentialStore};
use authdemo::{create_app, AppState};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let repo: Arc<dyn UserRepository> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::migrate(&pool).await?;
            db::roles_ensure(&pool).await?;
            tracing::info!("using PostgreSQL credential store");
            Arc::new(db::PgUserRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; accounts are kept in memory and lost on restart");
            Arc::new(InMemoryRepository::new())
        }
    };

    let store = CredentialStore::new(repo, AccountPolicy::with_min_length(config.password_min_length));
    let issuer = TokenIssuer::new(config.jwt.clone());
    let state = AppState::new(AccountService::new(store, issuer));

    let app = create_app(state).layer(CorsLayer::permissive());

    tracing::info!(addr = %config.server_addr, issuer = %config.jwt.issuer(), "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
