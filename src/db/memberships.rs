use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ProjectMembership;

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    project_id: Uuid,
    role: &str,
) -> Result<ProjectMembership, sqlx::Error> {
    sqlx::query_as::<_, ProjectMembership>(
        "INSERT INTO project_memberships (user_id, project_id, role)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user_id)
    .bind(project_id)
    .bind(role)
    .fetch_one(executor)
    .await
}

pub async fn list_by_project(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Vec<ProjectMembership>, sqlx::Error> {
    sqlx::query_as::<_, ProjectMembership>(
        "SELECT * FROM project_memberships WHERE project_id = $1 ORDER BY created_at ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}
