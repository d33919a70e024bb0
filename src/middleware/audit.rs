use sqlx::PgPool;

use crate::db::audit::NewAuditEvent;

/// Record an audit entry. Called explicitly by handlers after a privileged
/// mutation; a failed write is logged and never fails the request.
pub async fn log_event(pool: &PgPool, entry: &NewAuditEvent<'_>) {
    if let Err(e) = crate::db::audit::log_event(pool, entry).await {
        tracing::error!("Failed to log audit event {}: {e}", entry.event);
    }
}
