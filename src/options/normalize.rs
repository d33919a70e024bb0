use serde_json::Value;

/// Split newline-delimited input into lower-cased, trimmed, non-empty entries.
pub fn clean_newline_inputs(value: &str) -> Vec<String> {
    value
        .split('\n')
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Like `clean_newline_inputs` but keeps the original case.
pub fn trim_newline_inputs(value: &str) -> Vec<String> {
    value
        .split('\n')
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .collect()
}

/// Collect the entries of a textarea value, which may arrive either as a
/// newline-delimited string or as a list of strings.
pub fn textarea_entries(value: &Value, lowercase: bool) -> Vec<String> {
    let split = |s: &str| {
        if lowercase {
            clean_newline_inputs(s)
        } else {
            trim_newline_inputs(s)
        }
    };

    match value {
        Value::String(s) => split(s),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .flat_map(split)
            .collect(),
        _ => Vec::new(),
    }
}

/// Render a stored list back into the newline-delimited form clients edit.
pub fn join_lines(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}
