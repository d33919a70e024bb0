use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::models::{Project, ProjectStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// The project moved to pending deletion and a purge task was queued.
    Scheduled { transaction_id: String },
    /// Someone else already moved it out of `Visible`; nothing was queued.
    AlreadyPending,
}

/// Hide the project and queue its purge `delay_secs` from now.
///
/// The conditional status update decides the winner between concurrent
/// requests; the losers get `AlreadyPending` and queue nothing.
pub async fn schedule(
    pool: &PgPool,
    project: &Project,
    delay_secs: i64,
) -> Result<ScheduleOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let updated = db::projects::transition_status(
        &mut *tx,
        project.id,
        ProjectStatus::Visible,
        ProjectStatus::PendingDeletion,
    )
    .await?;

    if !updated {
        tx.rollback().await?;
        return Ok(ScheduleOutcome::AlreadyPending);
    }

    let transaction_id = Uuid::now_v7().simple().to_string();
    db::deletion_queue::enqueue(&mut *tx, project.id, &transaction_id, delay_secs).await?;
    tx.commit().await?;

    tracing::info!(
        object_id = %project.id,
        transaction_id = %transaction_id,
        model = "Project",
        "object.delete.queued"
    );

    Ok(ScheduleOutcome::Scheduled { transaction_id })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    Purged,
    /// The project is gone or no longer pending deletion.
    Skipped,
}

/// Remove a project pending deletion together with everything it owns.
pub async fn purge(pool: &PgPool, project_id: Uuid) -> Result<PurgeOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let claimed = db::projects::transition_status(
        &mut *tx,
        project_id,
        ProjectStatus::PendingDeletion,
        ProjectStatus::DeletionInProgress,
    )
    .await?;

    if !claimed {
        tx.rollback().await?;
        return Ok(PurgeOutcome::Skipped);
    }

    db::project_options::delete_for_project(&mut *tx, project_id).await?;
    db::user_options::delete_for_project(&mut *tx, project_id).await?;
    db::bookmarks::delete_for_project(&mut *tx, project_id).await?;
    db::groups::delete_for_project(&mut *tx, project_id).await?;
    db::projects::delete(&mut *tx, project_id).await?;

    tx.commit().await?;
    Ok(PurgeOutcome::Purged)
}
