pub mod audit;
pub mod memberships;
pub mod memory;
pub mod projects;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AuditEvent, NewProject, Project, ProjectMembership, ROLE_OWNER};

pub use memory::MemoryStore;

#[derive(Debug)]
pub enum StoreError {
    /// A unique constraint rejected the write. Carries the constraint name when known.
    Conflict(String),
    Database(sqlx::Error),
    Internal(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Conflict(constraint) => write!(f, "Unique violation: {constraint}"),
            StoreError::Database(err) => write!(f, "Database error: {err}"),
            StoreError::Internal(msg) => write!(f, "Store error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(db_err.constraint().unwrap_or("unique").to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Persistent storage for projects, their memberships and the audit trail.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Project>, StoreError>;

    async fn find_by_slug_for_user(
        &self,
        slug: &str,
        user_id: Uuid,
    ) -> Result<Option<Project>, StoreError>;

    /// Insert the project and an `owner` membership for `owner_id` as one write.
    /// Either both rows exist afterwards or neither does.
    async fn create_with_owner(
        &self,
        project: &NewProject,
        owner_id: Uuid,
    ) -> Result<Project, StoreError>;

    async fn list_members(&self, project_id: Uuid) -> Result<Vec<ProjectMembership>, StoreError>;

    async fn log_event(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        resource_type: &str,
        resource_id: Option<Uuid>,
        details: Option<serde_json::Value>,
    ) -> Result<(), StoreError>;

    async fn recent_events(&self, limit: i64) -> Result<Vec<AuditEvent>, StoreError>;
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Project>, StoreError> {
        Ok(projects::list_for_user(&self.pool, user_id).await?)
    }

    async fn find_by_slug_for_user(
        &self,
        slug: &str,
        user_id: Uuid,
    ) -> Result<Option<Project>, StoreError> {
        Ok(projects::find_by_slug_for_user(&self.pool, slug, user_id).await?)
    }

    async fn create_with_owner(
        &self,
        project: &NewProject,
        owner_id: Uuid,
    ) -> Result<Project, StoreError> {
        let mut tx = self.pool.begin().await?;

        let created = projects::create(
            &mut *tx,
            Uuid::now_v7(),
            &project.name,
            &project.slug,
            &project.domain,
        )
        .await?;
        memberships::create(&mut *tx, owner_id, created.id, ROLE_OWNER).await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn list_members(&self, project_id: Uuid) -> Result<Vec<ProjectMembership>, StoreError> {
        Ok(memberships::list_by_project(&self.pool, project_id).await?)
    }

    async fn log_event(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        resource_type: &str,
        resource_id: Option<Uuid>,
        details: Option<serde_json::Value>,
    ) -> Result<(), StoreError> {
        Ok(audit::log_event(&self.pool, user_id, action, resource_type, resource_id, details).await?)
    }

    async fn recent_events(&self, limit: i64) -> Result<Vec<AuditEvent>, StoreError> {
        Ok(audit::list(&self.pool, limit, 0).await?)
    }
}
