use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Project;

/// Projects the user holds any membership in, oldest first.
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "SELECT p.* FROM projects p
         JOIN project_memberships m ON m.project_id = p.id
         WHERE m.user_id = $1
         ORDER BY p.created_at ASC, p.id ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn find_by_slug_for_user(
    pool: &PgPool,
    slug: &str,
    user_id: Uuid,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "SELECT p.* FROM projects p
         JOIN project_memberships m ON m.project_id = p.id
         WHERE p.slug = $1 AND m.user_id = $2",
    )
    .bind(slug)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    name: &str,
    slug: &str,
    domain: &str,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "INSERT INTO projects (id, name, slug, domain) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(slug)
    .bind(domain)
    .fetch_one(executor)
    .await
}
