//! Auth extractor: validated bearer token claims.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;

use crate::auth::Claims;
use crate::error::AppError;
use crate::handlers::http::AppState;

/// Extractor: claims of a valid `Authorization: Bearer <token>` header.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Claims);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppError::Unauthorized("Missing or invalid Authorization header".to_string())
                })?;
        let claims = state.accounts().issuer().validate(bearer.token()).map_err(|e| {
            debug!(error = %e, "rejected bearer token");
            e
        })?;
        Ok(CurrentUser(claims))
    }
}
