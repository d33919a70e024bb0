use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Organization, OrganizationMember};

pub async fn create(pool: &PgPool, name: &str, slug: &str) -> Result<Organization, sqlx::Error> {
    sqlx::query_as::<_, Organization>(
        "INSERT INTO organizations (name, slug) VALUES ($1, $2) RETURNING *",
    )
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Organization>, sqlx::Error> {
    sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn add_member(
    pool: &PgPool,
    organization_id: Uuid,
    user_id: Uuid,
    role: &str,
) -> Result<OrganizationMember, sqlx::Error> {
    sqlx::query_as::<_, OrganizationMember>(
        "INSERT INTO organization_members (organization_id, user_id, role)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(organization_id)
    .bind(user_id)
    .bind(role)
    .fetch_one(pool)
    .await
}

pub async fn find_member(
    pool: &PgPool,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<Option<OrganizationMember>, sqlx::Error> {
    sqlx::query_as::<_, OrganizationMember>(
        "SELECT * FROM organization_members WHERE organization_id = $1 AND user_id = $2",
    )
    .bind(organization_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
