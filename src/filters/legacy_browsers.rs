use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::user_agent::{Browser, UserAgentParser};
use super::FilterState;
use crate::error::AppError;
use crate::models::Project;
use crate::options::OptionStore;

pub const FILTER_ID: &str = "legacy-browsers";
pub const NAME: &str = "Filter out known errors from legacy browsers";
pub const DESCRIPTION: &str = "Older browsers often give less accurate information, and while they may report valid issues, the context to understand them is incorrect or missing.";

/// Minimum supported major version per browser family when the filter is
/// enabled as a whole.
const MIN_VERSIONS: &[(&str, u32)] = &[
    ("Chrome", 0),
    ("IE", 10),
    ("Firefox", 0),
    ("Safari", 6),
    ("Edge", 0),
    ("Opera", 15),
    ("Android", 4),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subfilter {
    IePre9,
    Ie9,
    OperaPre15,
    AndroidPre4,
    SafariPre6,
}

impl Subfilter {
    pub const ALL: [Subfilter; 5] = [
        Subfilter::IePre9,
        Subfilter::Ie9,
        Subfilter::OperaPre15,
        Subfilter::AndroidPre4,
        Subfilter::SafariPre6,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Subfilter::IePre9 => "ie_pre_9",
            Subfilter::Ie9 => "ie9",
            Subfilter::OperaPre15 => "opera_pre_15",
            Subfilter::AndroidPre4 => "android_pre_4",
            Subfilter::SafariPre6 => "safari_pre_6",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn predicate(self) -> fn(&Browser) -> bool {
        match self {
            Subfilter::IePre9 => |b| version_of(b, "IE").is_some_and(|v| v <= 8),
            Subfilter::Ie9 => |b| version_of(b, "IE") == Some(9),
            Subfilter::OperaPre15 => |b| version_of(b, "Opera").is_some_and(|v| v < 15),
            Subfilter::AndroidPre4 => |b| version_of(b, "Android").is_some_and(|v| v < 4),
            Subfilter::SafariPre6 => |b| version_of(b, "Safari").is_some_and(|v| v < 6),
        }
    }

    pub fn matches(self, browser: &Browser) -> bool {
        (self.predicate())(browser)
    }
}

fn version_of(browser: &Browser, family: &str) -> Option<u32> {
    if browser.family == family {
        browser.major
    } else {
        None
    }
}

/// The whole-filter check: below the family's minimum version.
pub fn filter_default(browser: &Browser) -> bool {
    let Some((_, minimum)) = MIN_VERSIONS.iter().find(|(family, _)| *family == browser.family)
    else {
        return false;
    };
    browser.major.is_some_and(|major| major < *minimum)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnableRequest {
    pub active: Option<bool>,
    pub subfilters: Option<Vec<String>>,
}

fn option_key() -> String {
    format!("filters:{FILTER_ID}")
}

fn state_from_value(value: &Value) -> FilterState {
    match value {
        Value::String(s) if s == "1" => FilterState::All,
        Value::Bool(true) => FilterState::All,
        Value::Array(items) => {
            let subfilters: BTreeSet<String> = items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect();
            if subfilters.is_empty() {
                FilterState::Off
            } else {
                FilterState::Subset(subfilters)
            }
        }
        _ => FilterState::Off,
    }
}

pub async fn is_enabled(
    project: &Project,
    store: &dyn OptionStore,
) -> Result<FilterState, AppError> {
    let value = project
        .get_option_or(store, &option_key(), Value::String("0".to_string()))
        .await?;
    Ok(state_from_value(&value))
}

/// Store the filter configuration. `active` takes precedence; otherwise a
/// non-empty subfilter list enables just those subfilters.
pub async fn enable(
    project: &Project,
    store: &dyn OptionStore,
    request: &EnableRequest,
) -> Result<FilterState, AppError> {
    let value = match (request.active, &request.subfilters) {
        (Some(true), _) => Value::String("1".to_string()),
        (Some(false), _) => Value::String("0".to_string()),
        (None, Some(subfilters)) if !subfilters.is_empty() => {
            let mut chosen = BTreeSet::new();
            for id in subfilters {
                let subfilter = Subfilter::from_id(id).ok_or_else(|| {
                    AppError::field("subfilters", format!("\"{id}\" is not a valid choice."))
                })?;
                chosen.insert(subfilter.id());
            }
            Value::from(chosen.into_iter().collect::<Vec<_>>())
        }
        _ => Value::String("0".to_string()),
    };

    project.update_option(store, &option_key(), &value).await?;
    Ok(state_from_value(&value))
}

/// Extract the User-Agent from an event's HTTP interface.
pub fn get_user_agent(event: &Value) -> Option<&str> {
    let headers = event.get("sentry.interfaces.Http")?.get("headers")?;
    match headers {
        Value::Array(pairs) => pairs.iter().find_map(|pair| {
            let key = pair.get(0)?.as_str()?;
            if key.eq_ignore_ascii_case("user-agent") {
                pair.get(1)?.as_str()
            } else {
                None
            }
        }),
        Value::Object(map) => map
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("user-agent"))
            .and_then(|(_, v)| v.as_str()),
        _ => None,
    }
}

/// Decide whether an event should be dropped under the given configuration.
pub fn test_event(state: &FilterState, event: &Value, parser: &dyn UserAgentParser) -> bool {
    if event.get("platform").and_then(|p| p.as_str()) != Some("javascript") {
        return false;
    }

    let Some(user_agent) = get_user_agent(event).filter(|ua| !ua.is_empty()) else {
        return false;
    };
    let Some(browser) = parser.parse(user_agent) else {
        return false;
    };
    if browser.family.is_empty() {
        return false;
    }

    match state {
        FilterState::Off => false,
        FilterState::All => filter_default(&browser),
        FilterState::Subset(ids) => ids
            .iter()
            .filter_map(|id| Subfilter::from_id(id))
            .any(|subfilter| subfilter.matches(&browser)),
    }
}

pub async fn test(
    project: &Project,
    store: &dyn OptionStore,
    event: &Value,
    parser: &dyn UserAgentParser,
) -> Result<bool, AppError> {
    let state = is_enabled(project, store).await?;
    Ok(test_event(&state, event, parser))
}
