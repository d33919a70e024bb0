use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PROJECT_ADD: &str = "project.add";
pub const PROJECT_EDIT: &str = "project.edit";
pub const PROJECT_REMOVE: &str = "project.remove";

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub event: String,
    pub target_object: Option<Uuid>,
    pub data: Option<serde_json::Value>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
