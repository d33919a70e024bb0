use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::{Organization, Project, Team};
use crate::plugins::PluginSummary;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub is_public: bool,
    pub is_bookmarked: bool,
    pub call_sign: String,
    pub color: String,
    pub date_created: DateTime<Utc>,
    pub first_event: Option<DateTime<Utc>>,
    pub status: &'static str,
}

impl ProjectSummary {
    pub fn new(project: &Project, is_bookmarked: bool) -> Self {
        Self {
            id: project.id,
            slug: project.slug.clone(),
            name: project.name.clone(),
            is_public: project.public,
            is_bookmarked,
            call_sign: project.callsign(),
            color: project.color(),
            date_created: project.date_added,
            first_event: project.first_event,
            status: project.status.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            slug: team.slug.clone(),
            name: team.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganizationSummary {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

impl From<&Organization> for OrganizationSummary {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id,
            slug: org.slug.clone(),
            name: org.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectStats {
    pub unresolved: i64,
}

/// Full project read model. The optional parts are only present on GET.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: ProjectSummary,
    pub options: Map<String, Value>,
    pub digests_min_delay: i64,
    pub digests_max_delay: i64,
    pub security_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<PluginSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ProjectStats>,
}
