//! Identity records and the fixed role vocabulary.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Named permission group. The vocabulary is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    User,
    Administrator,
    VipUser,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Administrator, Role::VipUser];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Administrator => "Administrator",
            Role::VipUser => "VipUser",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Role {0} does not exist.")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Upper-cased form used for case-insensitive username lookups.
pub fn normalize_user_name(user_name: &str) -> String {
    user_name.trim().to_uppercase()
}

/// A registered account as held by the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub user_name: String,
    pub normalized_user_name: String,
    pub email: String,
    pub password_hash: String,
    /// Opaque value rotated whenever credentials change.
    pub security_stamp: String,
    pub created_at: DateTime<Utc>,
}

/// Account data supplied at registration, before the password is hashed.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub user_name: String,
    pub email: String,
    pub security_stamp: String,
}

impl NewIdentity {
    /// Build a new account with a fresh random security stamp.
    pub fn new(user_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            email: email.into(),
            security_stamp: Uuid::new_v4().to_string(),
        }
    }
}
