use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

pub const STATUS_UNRESOLVED: i16 = 0;

/// Count unresolved groups, optionally only those seen since `seen_since`.
pub async fn count_unresolved(
    pool: &PgPool,
    project_id: Uuid,
    seen_since: Option<DateTime<Utc>>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM groups
         WHERE project_id = $1 AND status = $2
           AND ($3::timestamptz IS NULL OR last_seen >= $3)",
    )
    .bind(project_id)
    .bind(STATUS_UNRESOLVED)
    .bind(seen_since)
    .fetch_one(pool)
    .await
}

pub async fn delete_for_project<'e>(
    executor: impl PgExecutor<'e>,
    project_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM groups WHERE project_id = $1")
        .bind(project_id)
        .execute(executor)
        .await?;
    Ok(())
}
