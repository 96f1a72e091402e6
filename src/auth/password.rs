//! Password hashing/verification and the account policy applied on creation.

use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

const ALLOWED_USER_NAME_SYMBOLS: &str = "-._@+";

/// Verified against when the account does not exist, so a miss costs the same
/// Argon2 work as a wrong password.
static ABSENT_ACCOUNT_HASH: Lazy<Option<String>> = Lazy::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"absent-account", &salt)
        .map(|hash| hash.to_string())
        .ok()
});

#[cfg(test)]
thread_local! {
    static VERIFY_CALLS: std::cell::Cell<usize> = std::cell::Cell::new(0);
}

/// Argon2 verifications performed on the current thread.
#[cfg(test)]
pub(crate) fn verify_calls() -> usize {
    VERIFY_CALLS.with(|calls| calls.get())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("hash: {}", e)))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    #[cfg(test)]
    VERIFY_CALLS.with(|calls| calls.set(calls.get() + 1));

    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("parse hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Spend one verification on a throwaway hash. Always reports a mismatch.
pub fn verify_absent_account(password: &str) -> bool {
    if let Some(hash) = ABSENT_ACCOUNT_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}

/// Rules a new account must satisfy before the store accepts it.
///
/// Every rule is checked; [`AccountPolicy::check`] reports all violations at once.
#[derive(Debug, Clone)]
pub struct AccountPolicy {
    pub min_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

impl AccountPolicy {
    pub fn with_min_length(min_length: usize) -> Self {
        Self {
            min_length,
            ..Self::default()
        }
    }

    /// Returns every reason the username/password pair is rejected. Empty means accepted.
    pub fn check(&self, user_name: &str, password: &str) -> Vec<String> {
        let mut reasons = Vec::new();

        let valid_name = !user_name.is_empty()
            && user_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || ALLOWED_USER_NAME_SYMBOLS.contains(c));
        if !valid_name {
            reasons.push(format!(
                "Username '{}' is invalid, can only contain letters or digits.",
                user_name
            ));
        }

        if password.chars().count() < self.min_length {
            reasons.push(format!(
                "Passwords must be at least {} characters.",
                self.min_length
            ));
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_ascii_alphanumeric()) {
            reasons.push("Passwords must have at least one non alphanumeric character.".to_string());
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            reasons.push("Passwords must have at least one digit ('0'-'9').".to_string());
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            reasons.push("Passwords must have at least one lowercase ('a'-'z').".to_string());
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            reasons.push("Passwords must have at least one uppercase ('A'-'Z').".to_string());
        }

        reasons
    }
}
