//! Coercion of loosely-typed model JSON into domain records.
//!
//! Models return strings where lists are expected, numbers where strings
//! are expected, and stray whitespace everywhere. These helpers accept all
//! of that and never fail; callers decide what is required.

use serde_json::{Map, Value};

use crate::domain::errors::DomainError;

/// A trimmed, non-empty string built from a scalar.
///
/// Objects, arrays and null yield `None`.
pub fn coerce_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// A list of trimmed, non-empty strings.
///
/// A lone scalar counts as a one-element list.
pub fn coerce_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(coerce_string).collect(),
        other => coerce_string(other).into_iter().collect(),
    }
}

pub fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(coerce_string)
}

pub fn list_field(object: &Map<String, Value>, key: &str) -> Vec<String> {
    object.get(key).map(coerce_string_list).unwrap_or_default()
}

/// The record array inside `{"<key>": [...]}` or a bare array.
pub fn record_array<'a>(value: &'a Value, key: &str) -> Result<&'a [Value], DomainError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(object) => match object.get(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(DomainError::ValidationFailed(format!(
                "\"{key}\" must be an array"
            ))),
            None => Err(DomainError::ValidationFailed(format!(
                "expected an object with \"{key}\" or an array"
            ))),
        },
        _ => Err(DomainError::ValidationFailed(format!(
            "expected an object with \"{key}\" or an array"
        ))),
    }
}
