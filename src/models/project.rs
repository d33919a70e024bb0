use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[repr(i16)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Visible = 0,
    Hidden = 1,
    PendingDeletion = 2,
    DeletionInProgress = 3,
}

impl ProjectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Visible => "active",
            ProjectStatus::Hidden => "hidden",
            ProjectStatus::PendingDeletion => "pending_deletion",
            ProjectStatus::DeletionInProgress => "deletion_in_progress",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub team_id: Uuid,
    pub slug: String,
    pub name: String,
    pub forced_color: Option<String>,
    pub public: bool,
    pub status: ProjectStatus,
    pub first_event: Option<DateTime<Utc>>,
    pub date_added: DateTime<Utc>,
}

impl Project {
    pub fn callsign(&self) -> String {
        self.slug.to_uppercase()
    }

    pub fn color(&self) -> String {
        match &self.forced_color {
            Some(color) => format!("#{color}"),
            None => hashed_color(&self.callsign()),
        }
    }

    /// Whether the project is one the platform itself reports into.
    pub fn is_internal(&self, internal_projects: &[String]) -> bool {
        let id = self.id.to_string();
        internal_projects
            .iter()
            .any(|value| *value == id || *value == self.slug)
    }

    pub fn full_name(&self, team_name: &str) -> String {
        if self.name.contains(team_name) {
            self.name.clone()
        } else {
            format!("{team_name} {}", self.name)
        }
    }

    pub fn audit_log_data(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "slug": self.slug,
            "name": self.name,
            "status": self.status as i16,
            "public": self.public,
        })
    }
}

/// Stable colour derived from a string, as a `#rrggbb` hex value.
pub fn hashed_color(seed: &str) -> String {
    // FNV-1a
    let mut hash: u32 = 0x811c_9dc5;
    for byte in seed.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    format!("#{:06x}", hash & 0x00ff_ffff)
}
