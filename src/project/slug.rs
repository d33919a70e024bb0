use std::time::Duration;

use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::db::projects::NewProject;
use crate::error::AppError;
use crate::locks::{LockManager, TimedRetryPolicy};
use crate::models::Project;

pub const SLUG_MAX_LENGTH: usize = 50;
const SLUG_LOCK_KEY: &str = "slug:project";
const SLUG_LOCK_TIMEOUT: Duration = Duration::from_secs(10);
const NUMBERED_ATTEMPTS: usize = 10;

pub fn slugify(name: &str) -> String {
    let slug = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    truncate(&slug, SLUG_MAX_LENGTH)
}

fn truncate(slug: &str, max: usize) -> String {
    let cut: String = slug.chars().take(max).collect();
    cut.trim_end_matches('-').to_string()
}

/// Slug candidates for `base`: the base itself, numbered variants, then a
/// random suffix.
pub fn candidates(base: &str) -> Vec<String> {
    let base = if base.is_empty() { "project" } else { base };
    let mut out = vec![base.to_string()];
    for n in 2..(NUMBERED_ATTEMPTS + 2) {
        let suffix = format!("-{n}");
        out.push(format!("{}{suffix}", truncate(base, SLUG_MAX_LENGTH - suffix.len())));
    }
    let suffix = format!("-{}", hex::encode(rand::random::<[u8; 4]>()));
    out.push(format!("{}{suffix}", truncate(base, SLUG_MAX_LENGTH - suffix.len())));
    out
}

async fn unique_slug(pool: &PgPool, organization_id: Uuid, name: &str) -> Result<String, AppError> {
    for candidate in candidates(&slugify(name)) {
        if !db::projects::slug_exists(pool, organization_id, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::Conflict(
        "Unable to find a free slug for this project".to_string(),
    ))
}

/// Insert a project. Without an explicit slug one is derived from the name
/// while holding the slug lock. Uniqueness is still enforced by the table and a
/// violation is returned to the caller.
pub async fn create_project(
    pool: &PgPool,
    locks: &LockManager,
    organization_id: Uuid,
    team_id: Uuid,
    name: &str,
    slug: Option<&str>,
) -> Result<Project, AppError> {
    if let Some(slug) = slug {
        let new = NewProject {
            organization_id,
            team_id,
            name,
            slug,
        };
        return Ok(db::projects::create(pool, &new).await?);
    }

    let guard = locks
        .get(SLUG_LOCK_KEY, super::GENERATION_LEASE)
        .acquire_with_retry(TimedRetryPolicy::new(SLUG_LOCK_TIMEOUT))
        .await?;

    let result = async {
        let slug = unique_slug(pool, organization_id, name).await?;
        let new = NewProject {
            organization_id,
            team_id,
            name,
            slug: &slug,
        };
        Ok::<_, AppError>(db::projects::create(pool, &new).await?)
    }
    .await;

    guard.release().await;
    result
}
