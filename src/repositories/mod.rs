//! Persistence seam for identities and role memberships.

mod memory_repo;

pub use memory_repo::InMemoryRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Identity, Role};

/// Raw identity persistence. Implementations must enforce username uniqueness
/// on `normalized_user_name` atomically with the insert.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_normalized_name(&self, normalized: &str) -> AppResult<Option<Identity>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>>;

    /// Fails with `AppError::DuplicateUser` when the normalized name already exists.
    async fn insert(&self, identity: &Identity) -> AppResult<()>;

    /// Removes the identity together with its role memberships.
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Fails with `AppError::RoleAssignment` when the membership cannot be added.
    async fn add_role(&self, id: Uuid, role: Role) -> AppResult<()>;

    async fn roles(&self, id: Uuid) -> AppResult<Vec<Role>>;
}
