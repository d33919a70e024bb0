use tokio::sync::watch;

use crate::db;
use crate::project::deletion::{self, PurgeOutcome};
use crate::state::SharedState;

/// Start the deletion worker pool on a dedicated Tokio runtime with its own
/// thread pool. Runs on a separate OS thread until shutdown is signaled.
pub fn run_pool(
    state: SharedState,
    shutdown: watch::Receiver<bool>,
    worker_count: usize,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("deletion-pool".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(worker_count)
                .thread_name("deletion-worker")
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::error!("Failed to build worker runtime: {e}");
                    return;
                }
            };

            runtime.block_on(async {
                let mut handles = Vec::with_capacity(worker_count);

                for id in 0..worker_count {
                    handles.push(tokio::spawn(run(id, state.clone(), shutdown.clone())));
                }

                tracing::info!("Deletion worker pool started ({worker_count} workers)");

                for handle in handles {
                    let _ = handle.await;
                }

                tracing::info!("Deletion worker pool stopped");
            });
        })
}

/// A single worker loop that polls the deletion queue.
async fn run(id: usize, state: SharedState, mut shutdown: watch::Receiver<bool>) {
    tracing::debug!("Worker {id} started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        match process_next(&state).await {
            Ok(true) => continue,
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Worker {id} error: {e}");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {}
            _ = shutdown.changed() => {}
        }
    }

    tracing::debug!("Worker {id} stopped");
}

/// Claim and run the next due deletion task. Returns true if a task was handled.
pub async fn process_next(state: &SharedState) -> Result<bool, String> {
    let task = db::deletion_queue::claim_next(&state.pool)
        .await
        .map_err(|e| format!("Failed to claim deletion task: {e}"))?;

    let Some(task) = task else {
        return Ok(false);
    };

    tracing::debug!(
        "Processing deletion task {} (project={}, attempt={})",
        task.id,
        task.project_id,
        task.attempts
    );

    match deletion::purge(&state.pool, task.project_id).await {
        Ok(outcome) => {
            if outcome == PurgeOutcome::Purged {
                tracing::info!(
                    object_id = %task.project_id,
                    transaction_id = %task.transaction_id,
                    model = "Project",
                    "object.delete.executed"
                );
            } else {
                tracing::debug!(
                    "Project {} is no longer pending deletion, skipping",
                    task.project_id
                );
            }
            db::deletion_queue::mark_completed(&state.pool, task.id)
                .await
                .map_err(|e| format!("Failed to complete deletion task: {e}"))?;
        }
        Err(e) => {
            let error = e.to_string();
            tracing::warn!(
                "Deletion of project {} failed (attempt {}/{}): {error}",
                task.project_id,
                task.attempts,
                task.max_attempts
            );
            db::deletion_queue::mark_failed(
                &state.pool,
                task.id,
                task.attempts,
                task.max_attempts,
                &error,
            )
            .await
            .map_err(|e| format!("Failed to record deletion failure: {e}"))?;
        }
    }

    Ok(true)
}
