use std::sync::Arc;

use uuid::Uuid;

use crate::db::{ProjectStore, StoreError};
use crate::models::Project;

/// Read side of projects: what a user can see.
pub struct ProjectDirectory {
    store: Arc<dyn ProjectStore>,
}

impl ProjectDirectory {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }

    /// Every project the user is a member of, in creation order.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Project>, StoreError> {
        self.store.list_for_user(user_id).await
    }

    pub async fn find_for_user(
        &self,
        slug: &str,
        user_id: Uuid,
    ) -> Result<Option<Project>, StoreError> {
        self.store.find_by_slug_for_user(slug, user_id).await
    }
}
