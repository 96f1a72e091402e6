//! Credential store: the lookup/create/verify/role capability handed to the account flows.

use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_absent_account, verify_password, AccountPolicy};
use crate::error::{AppError, AppResult};
use crate::models::{normalize_user_name, Identity, NewIdentity, Role};
use crate::repositories::UserRepository;

#[derive(Clone)]
pub struct CredentialStore {
    repo: Arc<dyn UserRepository>,
    policy: AccountPolicy,
}

impl CredentialStore {
    pub fn new(repo: Arc<dyn UserRepository>, policy: AccountPolicy) -> Self {
        Self { repo, policy }
    }

    /// Case-insensitive lookup.
    pub async fn find_by_name(&self, user_name: &str) -> AppResult<Option<Identity>> {
        self.repo
            .find_by_normalized_name(&normalize_user_name(user_name))
            .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>> {
        self.repo.find_by_id(id).await
    }

    /// Apply the account policy, hash the password and persist the identity.
    ///
    /// Policy failures come back as a single `CredentialCreation` carrying every reason.
    ///
    /// ```
    /// use authdemo::auth::password::AccountPolicy;
    /// use authdemo::models::NewIdentity;
    /// use authdemo::repositories::InMemoryRepository;
    /// use authdemo::CredentialStore;
    /// use std::sync::Arc;
    ///
    /// let store = CredentialStore::new(Arc::new(InMemoryRepository::new()), AccountPolicy::default());
    /// let identity =
    ///     tokio_test::block_on(store.create(NewIdentity::new("alice", "a@x.com"), "P@ssw0rd1")).unwrap();
    /// assert_eq!(identity.normalized_user_name, "ALICE");
    /// ```
    pub async fn create(&self, new: NewIdentity, password: &str) -> AppResult<Identity> {
        let reasons = self.policy.check(&new.user_name, password);
        if !reasons.is_empty() {
            debug!(count = reasons.len(), "account policy rejected registration");
            return Err(AppError::CredentialCreation(reasons));
        }

        let identity = Identity {
            id: Uuid::new_v4(),
            normalized_user_name: normalize_user_name(&new.user_name),
            user_name: new.user_name,
            email: new.email,
            password_hash: hash_password(password)?,
            security_stamp: new.security_stamp,
            created_at: Utc::now(),
        };
        self.repo.insert(&identity).await?;
        Ok(identity)
    }

    /// Verify `password` for a looked-up account. A missing account still pays
    /// for one Argon2 verification and never matches.
    pub async fn check_password(&self, identity: Option<&Identity>, password: &str) -> AppResult<bool> {
        match identity {
            Some(identity) => verify_password(password, &identity.password_hash),
            None => Ok(verify_absent_account(password)),
        }
    }

    pub async fn add_to_role(&self, identity: &Identity, role: Role) -> AppResult<()> {
        self.repo.add_role(identity.id, role).await
    }

    pub async fn roles(&self, identity: &Identity) -> AppResult<Vec<Role>> {
        self.repo.roles(identity.id).await
    }

    pub async fn delete(&self, identity: &Identity) -> AppResult<()> {
        self.repo.delete(identity.id).await
    }
}
