//! Normalization of loosely shaped RPC parameters.
//!
//! A logical argument may arrive as a bare object, wrapped under its entity
//! name (`{"contact": {...}}`), as the first element of an array, or, for id
//! arguments, as a bare number or numeric string. Everything is reduced to
//! one canonical value here before it reaches a service.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Keys that carry identifiers and keep their numeric form.
const ID_FIELDS: [&str; 3] = ["id", "user_id", "contact_id"];

/// Peels `{entity: X}` and `[X, ...]` layers off `params`.
#[must_use]
pub fn unwrap_entity(params: Value, entity: &str) -> Value {
    match params {
        Value::Array(items) => items
            .into_iter()
            .next()
            .map_or(Value::Null, |first| unwrap_entity(first, entity)),
        Value::Object(mut map) => match map.remove(entity) {
            Some(inner @ (Value::Object(_) | Value::Array(_))) => unwrap_entity(inner, entity),
            Some(other) => {
                map.insert(entity.to_string(), other);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Reads an integer id from a number, a numeric string, `{field: ..}` or the
/// first array element.
#[must_use]
pub fn extract_id(params: &Value, field: &str) -> Option<i32> {
    match params {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map.get(field).and_then(|v| extract_id(v, field)),
        Value::Array(items) => items.first().and_then(|v| extract_id(v, field)),
        _ => None,
    }
}

/// Like [`extract_id`], failing with a validation message when absent.
pub fn require_id(params: &Value, field: &str) -> Result<i32, String> {
    extract_id(params, field).ok_or_else(|| {
        format!("The {} field is required.", field.replace('_', " "))
    })
}

/// Deserializes an entity payload. Numbers and booleans in non-id fields are
/// turned into strings first, so `"phone": 5551234` is accepted.
pub fn payload<T: DeserializeOwned>(params: Value, entity: &str) -> Result<T, String> {
    let map = match params {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => return Err(format!("Invalid {entity} data format")),
    };

    let normalized: Map<String, Value> = map
        .into_iter()
        .map(|(key, value)| {
            let value = if ID_FIELDS.contains(&key.as_str()) {
                value
            } else {
                stringify_scalar(value)
            };
            (key, value)
        })
        .collect();

    serde_json::from_value(Value::Object(normalized))
        .map_err(|e| format!("Invalid {entity} data format: {e}"))
}

fn stringify_scalar(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => other,
    }
}
