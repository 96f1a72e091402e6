//! Registration and login flows.

use tracing::{debug, error, info, instrument, warn};

use crate::auth::{IssuedToken, TokenIssuer};
use crate::error::{AppError, AppResult};
use crate::models::{validate_request, Identity, LoginRequest, NewIdentity, RegisterRequest, Role};
use crate::services::CredentialStore;

/// Orchestrates the credential store and the token issuer.
#[derive(Clone)]
pub struct AccountService {
    store: CredentialStore,
    issuer: TokenIssuer,
}

impl AccountService {
    pub fn new(store: CredentialStore, issuer: TokenIssuer) -> Self {
        Self { store, issuer }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Create an account holding `role` and issue its first token.
    ///
    /// The account and its role membership appear together or not at all:
    /// if the role cannot be assigned the new identity is deleted again.
    #[instrument(skip(self, request), fields(username = %request.username, role = %role))]
    pub async fn register(&self, request: RegisterRequest, role: Role) -> AppResult<IssuedToken> {
        validate_request(&request)?;

        if self.store.find_by_name(&request.username).await?.is_some() {
            debug!("user name already taken");
            return Err(AppError::DuplicateUser);
        }

        let new = NewIdentity::new(request.username, request.email);
        let created = self.store.create(new, &request.password).await?;

        if let Err(err) = self.store.add_to_role(&created, role).await {
            if let Err(cleanup) = self.store.delete(&created).await {
                error!(user_id = %created.id, error = %cleanup, "failed to remove identity after role assignment error");
            }
            return Err(err);
        }

        let identity = self
            .store
            .find_by_id(created.id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("identity {} vanished after registration", created.id)))?;
        let token = self.issue_for(&identity).await?;
        info!(user_id = %identity.id, "user_registered");
        Ok(token)
    }

    /// Verify the password and issue a token. Unknown users and wrong passwords
    /// fail with the same `InvalidCredentials` error.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> AppResult<IssuedToken> {
        validate_request(&request)?;

        let found = self.store.find_by_name(&request.username).await?;
        let verified = self
            .store
            .check_password(found.as_ref(), &request.password)
            .await?;
        let identity = match found {
            Some(identity) if verified => identity,
            _ => {
                warn!("login rejected");
                return Err(AppError::InvalidCredentials);
            }
        };

        let token = self.issue_for(&identity).await?;
        info!(user_id = %identity.id, "user_logged_in");
        Ok(token)
    }

    async fn issue_for(&self, identity: &Identity) -> AppResult<IssuedToken> {
        let roles = self.store.roles(identity).await?;
        self.issuer
            .issue(&identity.user_name, roles.iter().map(Role::as_str))
    }
}
