//! In-process identity store, used when no database is configured and in tests.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::UserRepository;
use crate::error::{AppError, AppResult};
use crate::models::{Identity, Role};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, Identity>,
    by_name: HashMap<String, Uuid>,
    roles: HashMap<Uuid, BTreeSet<Role>>,
}

/// Identities and role memberships kept behind a single lock, so the
/// uniqueness check and the insert happen under one write guard.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn find_by_normalized_name(&self, normalized: &str) -> AppResult<Option<Identity>> {
        let state = self.state.read().await;
        Ok(state
            .by_name
            .get(normalized)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, identity: &Identity) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.by_name.contains_key(&identity.normalized_user_name) {
            return Err(AppError::DuplicateUser);
        }
        state
            .by_name
            .insert(identity.normalized_user_name.clone(), identity.id);
        state.users.insert(identity.id, identity.clone());
        debug!(user_id = %identity.id, "identity inserted");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(identity) = state.users.remove(&id) {
            state.by_name.remove(&identity.normalized_user_name);
        }
        state.roles.remove(&id);
        Ok(())
    }

    async fn add_role(&self, id: Uuid, role: Role) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&id) {
            return Err(AppError::RoleAssignment(vec![format!(
                "User {} does not exist.",
                id
            )]));
        }
        if !state.roles.entry(id).or_default().insert(role) {
            return Err(AppError::RoleAssignment(vec![format!(
                "User already in role '{}'.",
                role
            )]));
        }
        Ok(())
    }

    async fn roles(&self, id: Uuid) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        Ok(state
            .roles
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }
}
