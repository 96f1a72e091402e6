//! Request bodies for registration and login.

use serde::Deserialize;
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;

const USER_NAME_MAX_LENGTH: usize = 256;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "user_name_length"))]
    pub username: String,
    #[validate(email(message = "The Email field is not a valid e-mail address."))]
    pub email: String,
    #[validate(length(min = 1, message = "The Password field is required."))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "The UserName field is required."))]
    pub username: String,
    #[validate(length(min = 1, message = "The Password field is required."))]
    pub password: String,
}

fn user_name_length(user_name: &str) -> Result<(), ValidationError> {
    let message = if user_name.is_empty() {
        "The UserName field is required.".to_string()
    } else if user_name.chars().count() > USER_NAME_MAX_LENGTH {
        format!(
            "The field UserName must be a string with a maximum length of {}.",
            USER_NAME_MAX_LENGTH
        )
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new("length");
    err.message = Some(Cow::Owned(message));
    Err(err)
}

/// Run derive validation and flatten failures into response reasons.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request
        .validate()
        .map_err(|errors| AppError::Validation(validation_reasons(&errors)))
}

fn validation_reasons(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect()
}
