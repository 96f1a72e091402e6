//! Application error types for robust error handling.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const DUPLICATE_USER_MESSAGE: &str = "User name is already taken";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{}", DUPLICATE_USER_MESSAGE)]
    DuplicateUser,

    #[error("Credential creation failed: {}", .0.join("; "))]
    CredentialCreation(Vec<String>),

    #[error("Role assignment failed: {}", .0.join("; "))]
    RoleAssignment(Vec<String>),

    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Human-readable reasons surfaced in the response body.
    pub fn reasons(&self) -> Vec<String> {
        match self {
            AppError::Validation(reasons)
            | AppError::CredentialCreation(reasons)
            | AppError::RoleAssignment(reasons) => reasons.clone(),
            AppError::DuplicateUser => vec![DUPLICATE_USER_MESSAGE.to_string()],
            AppError::InvalidCredentials => vec![INVALID_CREDENTIALS_MESSAGE.to_string()],
            AppError::Unauthorized(msg) => vec![msg.clone()],
            AppError::Db(_) | AppError::Internal(_) => {
                vec!["Internal server error".to_string()]
            }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::DuplicateUser
            | AppError::CredentialCreation(_)
            | AppError::RoleAssignment(_)
            | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Db(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(json!({ "errors": self.reasons() }));
        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![rejection.body_text()])
    }
}

pub type AppResult<T> = Result<T, AppError>;
