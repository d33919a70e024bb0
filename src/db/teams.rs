use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Team;

pub async fn create(
    pool: &PgPool,
    organization_id: Uuid,
    name: &str,
    slug: &str,
) -> Result<Team, sqlx::Error> {
    sqlx::query_as::<_, Team>(
        "INSERT INTO teams (organization_id, name, slug) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(organization_id)
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(
    pool: &PgPool,
    organization_id: Uuid,
    slug: &str,
) -> Result<Option<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE organization_id = $1 AND slug = $2")
        .bind(organization_id)
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn add_member(
    pool: &PgPool,
    organization_member_id: Uuid,
    team_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO organization_member_teams (organization_member_id, team_id)
         VALUES ($1, $2)
         ON CONFLICT (organization_member_id, team_id) DO UPDATE SET is_active = TRUE",
    )
    .bind(organization_member_id)
    .bind(team_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Whether the user holds an active membership of the team.
pub async fn is_active_member(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
             SELECT 1 FROM organization_member_teams omt
             JOIN organization_members om ON om.id = omt.organization_member_id
             WHERE omt.team_id = $1 AND om.user_id = $2 AND omt.is_active
         )",
    )
    .bind(team_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}
