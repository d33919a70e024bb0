//! Parsing of partial project updates.
//!
//! Every key is optional. Problems are collected per field so a client gets
//! all of them in one response; nothing is applied while any remain.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::FieldErrors;
use crate::options::validators::{coerce_bool, coerce_int};
use crate::options::ConfigSchema;
use crate::project::slug::SLUG_MAX_LENGTH;

static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9_\-]+$").unwrap());

pub const NAME_MAX_LENGTH: usize = 200;
pub const SECURITY_TOKEN_MAX_LENGTH: usize = 64;
pub const DIGEST_DELAY_MIN: i64 = 60;
pub const DIGEST_DELAY_MAX: i64 = 3600;

pub const DIGESTS_ORDER_MESSAGE: &str =
    "The maximum delay on digests must be higher than the minimum.";

/// Which fields the caller may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRole {
    /// Full settings edit, for callers with `project:write`.
    Admin,
    /// Only the caller's own bookmark and subscription.
    Member,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectUpdate {
    pub is_bookmarked: Option<bool>,
    pub is_subscribed: Option<bool>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub digests_min_delay: Option<i64>,
    pub digests_max_delay: Option<i64>,
    /// Team slug; resolved against the organization by the caller.
    pub team: Option<String>,
    pub security_token: Option<String>,
    /// Options already validated and converted to their stored form.
    pub options: Option<Map<String, Value>>,
}

impl ProjectUpdate {
    /// Parse a request body. Fields the role may not touch are ignored.
    pub fn parse(body: &Value, role: UpdateRole, schema: &ConfigSchema) -> (Self, FieldErrors) {
        let mut errors = FieldErrors::new();
        let Some(obj) = body.as_object() else {
            add_error(
                &mut errors,
                "non_field_errors",
                "Invalid data. Expected a dictionary.",
            );
            return (Self::default(), errors);
        };

        let mut update = ProjectUpdate {
            is_bookmarked: read_bool(obj, "isBookmarked", &mut errors),
            is_subscribed: read_bool(obj, "isSubscribed", &mut errors),
            ..Default::default()
        };

        if role == UpdateRole::Member {
            return (update, errors);
        }

        update.name = read_string(obj, "name", NAME_MAX_LENGTH, None, &mut errors);
        update.slug = read_string(obj, "slug", SLUG_MAX_LENGTH, Some(&SLUG_RE), &mut errors);
        update.team = read_string(obj, "team", SLUG_MAX_LENGTH, Some(&SLUG_RE), &mut errors);
        update.security_token = read_string(
            obj,
            "securityToken",
            SECURITY_TOKEN_MAX_LENGTH,
            Some(&SLUG_RE),
            &mut errors,
        );
        update.digests_min_delay = read_int(
            obj,
            "digestsMinDelay",
            DIGEST_DELAY_MIN,
            DIGEST_DELAY_MAX,
            &mut errors,
        );
        update.digests_max_delay = read_int(
            obj,
            "digestsMaxDelay",
            DIGEST_DELAY_MIN,
            DIGEST_DELAY_MAX,
            &mut errors,
        );
        update.options = read_options(obj, schema, &mut errors);

        (update, errors)
    }

    pub fn changes_entity(&self) -> bool {
        self.name.is_some() || self.slug.is_some() || self.team.is_some()
    }
}

/// The maximum digest delay may never end up below the minimum.
pub fn check_digest_delays(min: i64, max: i64, errors: &mut FieldErrors) {
    if max < min {
        add_error(errors, "digestsMaxDelay", DIGESTS_ORDER_MESSAGE);
    }
}

pub fn add_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.into());
}

fn present<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<&'a Value> {
    match obj.get(field) {
        None => None,
        Some(Value::Null) => {
            add_error(errors, field, "This field may not be null.");
            None
        }
        Some(value) => Some(value),
    }
}

fn read_bool(obj: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Option<bool> {
    let value = present(obj, field, errors)?;
    let parsed = coerce_bool(value);
    if parsed.is_none() {
        add_error(errors, field, "Must be a valid boolean.");
    }
    parsed
}

fn read_string(
    obj: &Map<String, Value>,
    field: &str,
    max_length: usize,
    pattern: Option<&Regex>,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = present(obj, field, errors)?;
    let Some(s) = value.as_str() else {
        add_error(errors, field, "Not a valid string.");
        return None;
    };
    let s = s.trim();

    if s.is_empty() {
        add_error(errors, field, "This field may not be blank.");
        return None;
    }
    if s.chars().count() > max_length {
        add_error(
            errors,
            field,
            format!("Ensure this field has no more than {max_length} characters."),
        );
        return None;
    }
    if let Some(re) = pattern {
        if !re.is_match(s) {
            add_error(errors, field, "This value does not match the required pattern.");
            return None;
        }
    }
    Some(s.to_string())
}

fn read_int(
    obj: &Map<String, Value>,
    field: &str,
    min: i64,
    max: i64,
    errors: &mut FieldErrors,
) -> Option<i64> {
    let value = present(obj, field, errors)?;
    let Some(n) = coerce_int(value) else {
        add_error(errors, field, "A valid integer is required.");
        return None;
    };
    if n < min {
        add_error(
            errors,
            field,
            format!("Ensure this value is greater than or equal to {min}."),
        );
        return None;
    }
    if n > max {
        add_error(
            errors,
            field,
            format!("Ensure this value is less than or equal to {max}."),
        );
        return None;
    }
    Some(n)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn read_options(
    obj: &Map<String, Value>,
    schema: &ConfigSchema,
    errors: &mut FieldErrors,
) -> Option<Map<String, Value>> {
    let value = obj.get("options")?;
    let Some(input) = value.as_object() else {
        add_error(
            errors,
            "options",
            format!(
                "Incorrect type. Expected a mapping, but got {}",
                json_type_name(value)
            ),
        );
        return None;
    };

    match schema.clean_all(input) {
        Ok(cleaned) => Some(cleaned),
        Err(messages) => {
            for message in messages {
                add_error(errors, "options", message);
            }
            None
        }
    }
}
