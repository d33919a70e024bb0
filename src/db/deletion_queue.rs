use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::DeletionTask;

/// A `processing` task claimed longer ago than this belongs to a worker that
/// died mid-purge and is claimable again.
pub const CLAIM_TIMEOUT_SECS: i64 = 600;

/// Schedule the purge of a project `delay_secs` from now.
pub async fn enqueue<'e>(
    executor: impl PgExecutor<'e>,
    project_id: Uuid,
    transaction_id: &str,
    delay_secs: i64,
) -> Result<DeletionTask, sqlx::Error> {
    sqlx::query_as::<_, DeletionTask>(
        "INSERT INTO deletion_tasks (project_id, transaction_id, run_at)
         VALUES ($1, $2, now() + make_interval(secs => $3::double precision))
         RETURNING *",
    )
    .bind(project_id)
    .bind(transaction_id)
    .bind(delay_secs as f64)
    .fetch_one(executor)
    .await
}

/// Atomically claim the next due task using SELECT FOR UPDATE SKIP LOCKED.
/// Stale `processing` claims are picked up as well.
pub async fn claim_next(pool: &PgPool) -> Result<Option<DeletionTask>, sqlx::Error> {
    sqlx::query_as::<_, DeletionTask>(
        "UPDATE deletion_tasks
         SET status = 'processing', attempts = attempts + 1, claimed_at = now()
         WHERE id = (
             SELECT id FROM deletion_tasks
             WHERE attempts < max_attempts
               AND (
                   (status IN ('pending', 'failed') AND run_at <= now())
                   OR (status = 'processing'
                       AND claimed_at < now() - make_interval(secs => $1::double precision))
               )
             ORDER BY run_at ASC
             LIMIT 1
             FOR UPDATE SKIP LOCKED
         )
         RETURNING *",
    )
    .bind(CLAIM_TIMEOUT_SECS as f64)
    .fetch_optional(pool)
    .await
}

pub async fn mark_completed(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE deletion_tasks SET status = 'completed', completed_at = now()
         WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Mark as failed with exponential backoff. Once max attempts is reached the
/// task stays 'failed' and is no longer claimed.
pub async fn mark_failed(
    pool: &PgPool,
    id: Uuid,
    attempts: i32,
    max_attempts: i32,
    error: &str,
) -> Result<(), sqlx::Error> {
    if attempts >= max_attempts {
        sqlx::query(
            "UPDATE deletion_tasks SET status = 'failed', last_error = $2, completed_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
    } else {
        // 2^attempts seconds
        let backoff_secs = 2_i64.pow(attempts.max(0) as u32);
        sqlx::query(
            "UPDATE deletion_tasks
             SET status = 'failed',
                 last_error = $2,
                 run_at = now() + make_interval(secs => $3::double precision)
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .bind(backoff_secs as f64)
        .execute(pool)
        .await?;
    }
    Ok(())
}

pub async fn list_for_project(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Vec<DeletionTask>, sqlx::Error> {
    sqlx::query_as::<_, DeletionTask>(
        "SELECT * FROM deletion_tasks WHERE project_id = $1 ORDER BY created_at",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}
