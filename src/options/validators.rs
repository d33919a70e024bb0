use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::LazyLock;

use ipnet::IpNet;
use regex::Regex;
use serde_json::Value;

use super::schema::{FieldDescriptor, FieldType};

/// Checks and coerces a raw value according to the field's declared type.
pub type TypeValidator = fn(&FieldDescriptor, Value) -> Result<Value, String>;

/// Field-specific check, run on the value in its stored form.
pub type FieldValidator = fn(Value) -> Result<Value, String>;

static ORIGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\*|([a-z][a-z0-9+.\-]*://)?(\*\.)?[a-z0-9_\-.\[\]:]+(:(\d+|\*))?(/\S*)?)$")
        .unwrap()
});

pub const SUBJECT_PREFIX_MAX_LENGTH: usize = 200;

/// The validators applied to every field of a given type.
pub fn default_type_validators() -> HashMap<FieldType, Vec<TypeValidator>> {
    let mut table: HashMap<FieldType, Vec<TypeValidator>> = HashMap::new();
    table.insert(FieldType::String, vec![validate_string]);
    table.insert(FieldType::Boolean, vec![validate_boolean]);
    table.insert(FieldType::Range, vec![validate_integer, validate_range]);
    table.insert(FieldType::Textarea, vec![validate_textarea]);
    table
}

/// Loose boolean coercion: JSON booleans, 0/1 and the usual string spellings.
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Integer coercion accepting numbers and numeric strings.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn validate_string(_field: &FieldDescriptor, value: Value) -> Result<Value, String> {
    match value {
        Value::Null | Value::String(_) => Ok(value),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        _ => Err("Expected a string".to_string()),
    }
}

fn validate_boolean(_field: &FieldDescriptor, value: Value) -> Result<Value, String> {
    coerce_bool(&value)
        .map(Value::Bool)
        .ok_or_else(|| "Expected a boolean".to_string())
}

fn validate_integer(_field: &FieldDescriptor, value: Value) -> Result<Value, String> {
    coerce_int(&value)
        .map(Value::from)
        .ok_or_else(|| "A valid integer is required".to_string())
}

fn validate_range(field: &FieldDescriptor, value: Value) -> Result<Value, String> {
    let Some(n) = value.as_i64() else {
        return Err("A valid integer is required".to_string());
    };
    if let Some(min) = field.min {
        if n < min {
            return Err(format!("Ensure this value is greater than or equal to {min}"));
        }
    }
    if let Some(max) = field.max {
        if n > max {
            return Err(format!("Ensure this value is less than or equal to {max}"));
        }
    }
    if let Some(allowed) = field.allowed_values {
        if !allowed.contains(&n) {
            return Err(format!("{n} is not an allowed value"));
        }
    }
    Ok(value)
}

fn validate_textarea(_field: &FieldDescriptor, value: Value) -> Result<Value, String> {
    match &value {
        Value::Null => Ok(Value::String(String::new())),
        Value::String(_) => Ok(value),
        Value::Array(items) if items.iter().all(|v| v.is_string()) => Ok(value),
        _ => Err("Expected newline-separated text or a list of strings".to_string()),
    }
}

fn list_entries(value: &Value) -> impl Iterator<Item = &str> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str())
}

/// Every entry must be an IP address or a CIDR network.
pub fn validate_ip_list(value: Value) -> Result<Value, String> {
    for entry in list_entries(&value) {
        if entry.parse::<IpAddr>().is_err() && entry.parse::<IpNet>().is_err() {
            return Err(format!("{entry} is not a valid IP address or network"));
        }
    }
    Ok(value)
}

/// Every entry must be `*`, a host pattern or a URL.
pub fn validate_origins(value: Value) -> Result<Value, String> {
    for entry in list_entries(&value) {
        if !ORIGIN_RE.is_match(entry) {
            return Err(format!("{entry} is not an acceptable domain"));
        }
    }
    Ok(value)
}

pub fn validate_subject_prefix(value: Value) -> Result<Value, String> {
    if let Some(s) = value.as_str() {
        if s.chars().count() > SUBJECT_PREFIX_MAX_LENGTH {
            return Err(format!(
                "Ensure this value has at most {SUBJECT_PREFIX_MAX_LENGTH} characters"
            ));
        }
    }
    Ok(value)
}
