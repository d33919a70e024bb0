use sqlx::PgPool;
use uuid::Uuid;

use crate::models::AuditEvent;

pub struct NewAuditEvent<'a> {
    pub organization_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub event: &'a str,
    pub target_object: Option<Uuid>,
    pub data: Option<serde_json::Value>,
    pub transaction_id: Option<&'a str>,
}

pub async fn log_event(pool: &PgPool, entry: &NewAuditEvent<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_events (organization_id, actor_id, event, target_object, data, transaction_id)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(entry.organization_id)
    .bind(entry.actor_id)
    .bind(entry.event)
    .bind(entry.target_object)
    .bind(&entry.data)
    .bind(entry.transaction_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list(
    pool: &PgPool,
    organization_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<AuditEvent>, sqlx::Error> {
    sqlx::query_as::<_, AuditEvent>(
        "SELECT * FROM audit_events WHERE organization_id = $1
         ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(organization_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}
