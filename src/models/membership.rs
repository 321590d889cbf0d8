use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLE_OWNER: &str = "owner";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct ProjectMembership {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
}
