//! Account HTTP handlers: register (three role variants), login, me.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppError;
use crate::handlers::http::{AppJson, AppState};
use crate::middleware::auth::CurrentUser;
use crate::models::{LoginRequest, RegisterRequest, Role};

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub name: String,
    pub roles: Vec<String>,
    pub expires_at: String,
}

async fn register_as(
    state: &AppState,
    body: RegisterRequest,
    role: Role,
) -> Result<Json<TokenResponse>, AppError> {
    let issued = state.accounts().register(body, role).await?;
    Ok(Json(TokenResponse {
        token: issued.token,
    }))
}

/// POST /api/account/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    register_as(&state, body, Role::User).await
}

/// POST /api/account/register-admin
pub async fn register_admin(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    register_as(&state, body, Role::Administrator).await
}

/// POST /api/account/register-vip
pub async fn register_vip(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    register_as(&state, body, Role::VipUser).await
}

/// POST /api/account/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let issued = state.accounts().login(body).await?;
    Ok(Json(TokenResponse {
        token: issued.token,
    }))
}

/// GET /api/account/me — claims of the presented bearer token.
pub async fn me(CurrentUser(claims): CurrentUser) -> Json<MeResponse> {
    let expires_at = chrono::DateTime::from_timestamp(claims.exp, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    Json(MeResponse {
        name: claims.name,
        roles: claims.role,
        expires_at,
    })
}
