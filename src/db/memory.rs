use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{ProjectStore, StoreError};
use crate::models::{AuditEvent, NewProject, Project, ProjectMembership, ROLE_OWNER};

/// Process-local store with the same uniqueness rules as the Postgres schema.
/// Used when no `DATABASE_URL` is configured and by the test suite.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    projects: Vec<Project>,
    memberships: Vec<ProjectMembership>,
    events: Vec<AuditEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Internal("memory store lock poisoned".to_string()))
    }
}

impl Tables {
    fn is_member(&self, project_id: Uuid, user_id: Uuid) -> bool {
        self.memberships
            .iter()
            .any(|m| m.project_id == project_id && m.user_id == user_id)
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Project>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .projects
            .iter()
            .filter(|p| tables.is_member(p.id, user_id))
            .cloned()
            .collect())
    }

    async fn find_by_slug_for_user(
        &self,
        slug: &str,
        user_id: Uuid,
    ) -> Result<Option<Project>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .projects
            .iter()
            .find(|p| p.slug == slug && tables.is_member(p.id, user_id))
            .cloned())
    }

    async fn create_with_owner(
        &self,
        project: &NewProject,
        owner_id: Uuid,
    ) -> Result<Project, StoreError> {
        let mut tables = self.tables()?;

        if tables.projects.iter().any(|p| p.slug == project.slug) {
            return Err(StoreError::Conflict("projects_slug_key".to_string()));
        }
        if tables.projects.iter().any(|p| p.domain == project.domain) {
            return Err(StoreError::Conflict("projects_domain_key".to_string()));
        }

        let now = Utc::now();
        let created = Project {
            id: Uuid::now_v7(),
            name: project.name.clone(),
            slug: project.slug.clone(),
            domain: project.domain.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.projects.push(created.clone());
        tables.memberships.push(ProjectMembership {
            user_id: owner_id,
            project_id: created.id,
            role: ROLE_OWNER.to_string(),
            created_at: now,
        });

        Ok(created)
    }

    async fn list_members(&self, project_id: Uuid) -> Result<Vec<ProjectMembership>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .memberships
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn log_event(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        resource_type: &str,
        resource_id: Option<Uuid>,
        details: Option<serde_json::Value>,
    ) -> Result<(), StoreError> {
        self.tables()?.events.push(AuditEvent {
            id: Uuid::now_v7(),
            user_id,
            action: action.to_string(),
            resource_type: resource_type.to_string(),
            resource_id,
            details,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent_events(&self, limit: i64) -> Result<Vec<AuditEvent>, StoreError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .tables()?
            .events
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}
