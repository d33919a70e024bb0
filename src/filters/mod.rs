//! Inbound data filters configured per project.

pub mod legacy_browsers;
pub mod user_agent;

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::models::Project;
use crate::options::OptionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterState {
    Off,
    All,
    /// Only the listed subfilters.
    Subset(BTreeSet<String>),
}

impl FilterState {
    /// `true`/`false`, or the list of active subfilters.
    pub fn to_json(&self) -> Value {
        match self {
            FilterState::Off => Value::Bool(false),
            FilterState::All => Value::Bool(true),
            FilterState::Subset(ids) => Value::from(ids.iter().cloned().collect::<Vec<_>>()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub active: Value,
}

pub async fn list_for_project(
    project: &Project,
    store: &dyn OptionStore,
) -> Result<Vec<FilterSummary>, AppError> {
    let legacy = legacy_browsers::is_enabled(project, store).await?;
    Ok(vec![FilterSummary {
        id: legacy_browsers::FILTER_ID,
        name: legacy_browsers::NAME,
        description: legacy_browsers::DESCRIPTION,
        active: legacy.to_json(),
    }])
}
