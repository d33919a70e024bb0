//! Registry of the configuration options a project recognises.
//!
//! The schema is built once and handed to whoever validates or renders
//! options; nothing here is mutated after construction.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::normalize::{join_lines, textarea_entries};
use super::validators::{
    self, coerce_bool, coerce_int, FieldValidator, TypeValidator,
};

const RESOLVE_AGE_ALLOWED: &[i64] = &[
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 15, 18, 21, 24, 30, 36, 48, 72, 96, 120, 144, 168,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Boolean,
    Range,
    Textarea,
}

/// How a validated value is written to the option store and read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Plain string, null when unset.
    Text,
    Bool,
    Int,
    /// Lower-cased list; edited as newline-delimited text.
    NormalizedList,
    /// Trimmed list, case preserved; returned as a list.
    TrimmedList,
    /// `"1"` / `"0"` string, surfaced as a boolean.
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(&'static str),
    List(&'static [&'static str]),
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Null => Value::Null,
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Int(n) => Value::from(n),
            DefaultValue::Text(s) => Value::String(s.to_string()),
            DefaultValue::List(items) => {
                Value::Array(items.iter().map(|s| Value::String(s.to_string())).collect())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<&'static [i64]>,
    #[serde(skip)]
    pub storage: Storage,
    #[serde(skip)]
    pub default: DefaultValue,
    #[serde(skip)]
    pub validators: Vec<FieldValidator>,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, kind: FieldType, storage: Storage) -> Self {
        Self {
            name,
            kind,
            label: None,
            help: None,
            placeholder: None,
            required: false,
            min: None,
            max: None,
            step: None,
            allowed_values: None,
            storage,
            default: DefaultValue::Null,
            validators: Vec::new(),
        }
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn range(mut self, min: i64, max: i64, step: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self.step = Some(step);
        self
    }

    pub fn allowed_values(mut self, values: &'static [i64]) -> Self {
        self.allowed_values = Some(values);
        self
    }

    pub fn default(mut self, value: DefaultValue) -> Self {
        self.default = value;
        self
    }

    pub fn validator(mut self, validator: FieldValidator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Convert a type-checked value into the form kept in the option store.
    pub fn encode(&self, value: Value) -> Value {
        match self.storage {
            Storage::Text => value,
            Storage::Bool => Value::Bool(coerce_bool(&value).unwrap_or(false)),
            Storage::Int => coerce_int(&value).map(Value::from).unwrap_or(Value::from(0)),
            Storage::NormalizedList => Value::from(textarea_entries(&value, true)),
            Storage::TrimmedList => Value::from(textarea_entries(&value, false)),
            Storage::Flag => {
                let on = coerce_bool(&value).unwrap_or(false);
                Value::String(if on { "1" } else { "0" }.to_string())
            }
        }
    }

    /// Render a stored value (or the default when unset) for API responses.
    pub fn render(&self, stored: Option<&Value>) -> Value {
        let default = self.default.to_value();
        let value = match stored {
            Some(v) if !v.is_null() => v,
            _ => &default,
        };

        match self.storage {
            Storage::Text => value.clone(),
            Storage::Bool => Value::Bool(coerce_bool(value).unwrap_or(false)),
            Storage::Int => Value::from(coerce_int(value).unwrap_or(0)),
            Storage::NormalizedList => Value::String(join_lines(value)),
            Storage::TrimmedList => match value {
                Value::Array(_) => value.clone(),
                other => Value::from(textarea_entries(other, false)),
            },
            Storage::Flag => Value::Bool(match value {
                Value::String(s) => s == "1",
                other => coerce_bool(other).unwrap_or(false),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionError {
    Unknown(String),
    Invalid { key: String, message: String },
}

impl std::fmt::Display for OptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionError::Unknown(key) => write!(f, "Unknown option: {key}"),
            OptionError::Invalid { key, message } => write!(f, "{key}: {message}"),
        }
    }
}

pub struct ConfigSchema {
    fields: Vec<FieldDescriptor>,
    type_validators: HashMap<FieldType, Vec<TypeValidator>>,
}

impl ConfigSchema {
    pub fn new(
        fields: Vec<FieldDescriptor>,
        type_validators: HashMap<FieldType, Vec<TypeValidator>>,
    ) -> Self {
        Self {
            fields,
            type_validators,
        }
    }

    /// The built-in configuration options of a project, in display order.
    pub fn project() -> Self {
        let fields = vec![
            FieldDescriptor::new("mail:subject_prefix", FieldType::String, Storage::Text)
                .label("Subject prefix")
                .help("Choose a custom prefix for emails from this project.")
                .validator(validators::validate_subject_prefix),
            FieldDescriptor::new("sentry:default_environment", FieldType::String, Storage::Text)
                .label("Default environment")
                .placeholder("e.g. production")
                .help("The default selected environment when viewing issues."),
            FieldDescriptor::new("sentry:resolve_age", FieldType::Range, Storage::Int)
                .label("Auto resolve")
                .help(
                    "Automatically resolve an issue if it hasn't been seen for this amount of time.",
                )
                .range(0, 168, 1)
                .allowed_values(RESOLVE_AGE_ALLOWED)
                .default(DefaultValue::Int(0)),
            FieldDescriptor::new("sentry:scrub_data", FieldType::Boolean, Storage::Bool)
                .label("Data scrubber")
                .help("Enable server-side data scrubbing.")
                .default(DefaultValue::Bool(true)),
            FieldDescriptor::new("sentry:scrub_defaults", FieldType::Boolean, Storage::Bool)
                .label("Use default scrubbers")
                .help(
                    "Apply default scrubbers to prevent things like passwords and credit cards from being stored.",
                )
                .default(DefaultValue::Bool(true)),
            FieldDescriptor::new(
                "sentry:sensitive_fields",
                FieldType::Textarea,
                Storage::TrimmedList,
            )
            .label("Additional sensitive fields")
            .help(
                "Additional field names to match against when scrubbing data. Separate multiple entries with a newline.",
            )
            .placeholder("e.g. email")
            .default(DefaultValue::List(&[])),
            FieldDescriptor::new("sentry:safe_fields", FieldType::Textarea, Storage::TrimmedList)
                .label("Safe fields")
                .help(
                    "Field names which data scrubbers should ignore. Separate multiple entries with a newline.",
                )
                .placeholder("e.g. email")
                .default(DefaultValue::List(&[])),
            FieldDescriptor::new("sentry:scrub_ip_address", FieldType::Boolean, Storage::Bool)
                .label("Don't store IP Addresses")
                .help("Prevent IP addresses from being stored for new events.")
                .default(DefaultValue::Bool(false)),
            FieldDescriptor::new("sentry:origins", FieldType::Textarea, Storage::NormalizedList)
                .label("Allowed domains")
                .help("Separate multiple entries with a newline.")
                .placeholder("e.g. https://example.com")
                .default(DefaultValue::List(&["*"]))
                .validator(validators::validate_origins),
            FieldDescriptor::new(
                "sentry:blacklisted_ips",
                FieldType::Textarea,
                Storage::NormalizedList,
            )
            .label("Filtered IP addresses")
            .help("Separate multiple entries with a newline.")
            .placeholder("e.g. 127.0.0.1 or 192.168.0.1/24")
            .default(DefaultValue::List(&[]))
            .validator(validators::validate_ip_list),
            FieldDescriptor::new("sentry:scrape_javascript", FieldType::Boolean, Storage::Bool)
                .label("Enable JavaScript source fetching")
                .help("Allow missing JavaScript source context to be scraped when possible.")
                .default(DefaultValue::Bool(true)),
            FieldDescriptor::new(
                "sentry:csp_ignored_sources",
                FieldType::Textarea,
                Storage::NormalizedList,
            )
            .default(DefaultValue::List(&[])),
            FieldDescriptor::new(
                "sentry:csp_ignored_sources_defaults",
                FieldType::Boolean,
                Storage::Bool,
            )
            .default(DefaultValue::Bool(true)),
            FieldDescriptor::new("feedback:branding", FieldType::Boolean, Storage::Flag)
                .label("Show branding")
                .help("Show branding in the user feedback dialog.")
                .default(DefaultValue::Text("1")),
        ];

        Self::new(fields, validators::default_type_validators())
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate a single option, returning the value to store.
    ///
    /// Type validators run on the raw input, then the value is encoded into
    /// its stored form and the field's own validators run on that.
    pub fn clean(&self, key: &str, value: Value) -> Result<Value, OptionError> {
        let field = self
            .get(key)
            .ok_or_else(|| OptionError::Unknown(key.to_string()))?;
        let invalid = |message: String| OptionError::Invalid {
            key: key.to_string(),
            message,
        };

        let mut value = value;
        if let Some(type_validators) = self.type_validators.get(&field.kind) {
            for validator in type_validators {
                value = validator(field, value).map_err(invalid)?;
            }
        }

        let mut value = field.encode(value);
        for validator in &field.validators {
            value = validator(value).map_err(invalid)?;
        }
        Ok(value)
    }

    /// Validate every option in `input`. Errors are reported per option key.
    pub fn clean_all(&self, input: &Map<String, Value>) -> Result<Map<String, Value>, Vec<String>> {
        let mut cleaned = Map::new();
        let mut errors = Vec::new();

        for (key, value) in input {
            match self.clean(key, value.clone()) {
                Ok(v) => {
                    cleaned.insert(key.clone(), v);
                }
                Err(e) => errors.push(e.to_string()),
            }
        }

        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }

    /// Build the flattened `options` read model from the stored values.
    pub fn read_options(&self, stored: &HashMap<String, Value>) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|field| (field.name.to_string(), field.render(stored.get(field.name))))
            .collect()
    }
}
