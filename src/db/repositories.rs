//! Repositories: identities, roles, identity_roles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Identity, Role};
use crate::repositories::UserRepository;

// ---- Identities ----

#[derive(Debug, FromRow)]
pub struct IdentityRow {
    pub id: Uuid,
    pub user_name: String,
    pub normalized_user_name: String,
    pub email: String,
    pub password_hash: String,
    pub security_stamp: String,
    pub created_at: DateTime<Utc>,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Identity {
            id: row.id,
            user_name: row.user_name,
            normalized_user_name: row.normalized_user_name,
            email: row.email,
            password_hash: row.password_hash,
            security_stamp: row.security_stamp,
            created_at: row.created_at,
        }
    }
}

const IDENTITY_COLUMNS: &str =
    "id, user_name, normalized_user_name, email, password_hash, security_stamp, created_at";

pub async fn identity_insert(pool: &DbPool, identity: &Identity) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO identities (id, user_name, normalized_user_name, email, password_hash, security_stamp, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(identity.id)
    .bind(&identity.user_name)
    .bind(&identity.normalized_user_name)
    .bind(&identity.email)
    .bind(&identity.password_hash)
    .bind(&identity.security_stamp)
    .bind(identity.created_at)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::DuplicateUser),
        Err(e) => Err(e.into()),
    }
}

pub async fn identity_find_by_normalized_name(
    pool: &DbPool,
    normalized: &str,
) -> AppResult<Option<IdentityRow>> {
    let row = sqlx::query_as::<_, IdentityRow>(&format!(
        "SELECT {} FROM identities WHERE normalized_user_name = $1",
        IDENTITY_COLUMNS
    ))
    .bind(normalized)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn identity_get_by_id(pool: &DbPool, id: Uuid) -> AppResult<Option<IdentityRow>> {
    let row = sqlx::query_as::<_, IdentityRow>(&format!(
        "SELECT {} FROM identities WHERE id = $1",
        IDENTITY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn identity_delete(pool: &DbPool, id: Uuid) -> AppResult<()> {
    sqlx::query("DELETE FROM identities WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// ---- Roles ----

/// Insert the fixed role vocabulary. Safe to call on every start.
pub async fn roles_ensure(pool: &DbPool) -> AppResult<()> {
    for role in Role::ALL {
        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(role.as_str())
            .execute(pool)
            .await?;
    }
    Ok(())
}

pub async fn identity_role_add(pool: &DbPool, id: Uuid, role: Role) -> AppResult<()> {
    let result = sqlx::query("INSERT INTO identity_roles (identity_id, role_name) VALUES ($1, $2)")
        .bind(id)
        .bind(role.as_str())
        .execute(pool)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::RoleAssignment(
            vec![format!("User already in role '{}'.", role)],
        )),
        Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
            match missing_reference_reason(db.constraint(), id, role) {
                Some(reason) => Err(AppError::RoleAssignment(vec![reason])),
                None => Err(sqlx::Error::Database(db).into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

const IDENTITY_FK: &str = "identity_roles_identity_fk";
const ROLE_FK: &str = "identity_roles_role_fk";

/// Which side of `identity_roles` the violated foreign key points at.
fn missing_reference_reason(constraint: Option<&str>, id: Uuid, role: Role) -> Option<String> {
    match constraint? {
        IDENTITY_FK => Some(format!("User {} does not exist.", id)),
        ROLE_FK => Some(format!("Role {} does not exist.", role)),
        _ => None,
    }
}

pub async fn identity_roles_list(pool: &DbPool, id: Uuid) -> AppResult<Vec<Role>> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT role_name FROM identity_roles WHERE identity_id = $1 ORDER BY role_name",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    names
        .iter()
        .map(|name| {
            name.parse::<Role>()
                .map_err(|e| AppError::Internal(anyhow::anyhow!("stored role: {}", e)))
        })
        .collect()
}

/// [`UserRepository`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_normalized_name(&self, normalized: &str) -> AppResult<Option<Identity>> {
        Ok(identity_find_by_normalized_name(&self.pool, normalized)
            .await?
            .map(Identity::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>> {
        Ok(identity_get_by_id(&self.pool, id).await?.map(Identity::from))
    }

    async fn insert(&self, identity: &Identity) -> AppResult<()> {
        identity_insert(&self.pool, identity).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        identity_delete(&self.pool, id).await
    }

    async fn add_role(&self, id: Uuid, role: Role) -> AppResult<()> {
        identity_role_add(&self.pool, id, role).await
    }

    async fn roles(&self, id: Uuid) -> AppResult<Vec<Role>> {
        identity_roles_list(&self.pool, id).await
    }
}
