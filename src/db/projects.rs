use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::{Project, ProjectStatus};

pub struct NewProject<'a> {
    pub organization_id: Uuid,
    pub team_id: Uuid,
    pub name: &'a str,
    pub slug: &'a str,
}

pub async fn create(pool: &PgPool, new: &NewProject<'_>) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "INSERT INTO projects (organization_id, team_id, name, slug)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(new.organization_id)
    .bind(new.team_id)
    .bind(new.name)
    .bind(new.slug)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(
    pool: &PgPool,
    organization_id: Uuid,
    slug: &str,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE organization_id = $1 AND slug = $2",
    )
    .bind(organization_id)
    .bind(slug)
    .fetch_optional(pool)
    .await
}

/// Another project in the organization already using `slug`, if any.
pub async fn find_other_with_slug(
    pool: &PgPool,
    organization_id: Uuid,
    slug: &str,
    exclude_id: Uuid,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE organization_id = $1 AND slug = $2 AND id <> $3 LIMIT 1",
    )
    .bind(organization_id)
    .bind(slug)
    .bind(exclude_id)
    .fetch_optional(pool)
    .await
}

pub async fn slug_exists(
    pool: &PgPool,
    organization_id: Uuid,
    slug: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM projects WHERE organization_id = $1 AND slug = $2)",
    )
    .bind(organization_id)
    .bind(slug)
    .fetch_one(pool)
    .await
}

pub async fn update_fields(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    slug: &str,
    team_id: Uuid,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "UPDATE projects SET name = $2, slug = $3, team_id = $4
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(slug)
    .bind(team_id)
    .fetch_one(pool)
    .await
}

/// Move a project from `from` to `to`. Returns false when the project was not
/// in `from`, so only one caller ever wins the transition.
pub async fn transition_status<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    from: ProjectStatus,
    to: ProjectStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE projects SET status = $3 WHERE id = $1 AND status = $2")
        .bind(id)
        .bind(from)
        .bind(to)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}
