//! JSON value helpers shared by models and response handling.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Prefix of framework-internal keys that never leave the client.
pub const INTERNAL_PREFIX: &str = "$$";

static OBJECT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-f\d]{24}$").expect("Invalid regex"));

/// Returns `true` for values a loosely typed client treats as "no value":
/// `null`, `false`, `0` and the empty string.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Deep copy of `value` without `$$`-prefixed object keys.
pub fn value_to_json(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(value_to_json).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !key.starts_with(INTERNAL_PREFIX))
                .map(|(key, value)| (key.clone(), value_to_json(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Replaces objects carrying a truthy `id` by that id, element-wise for arrays.
///
/// ## Examples
///
/// ```rust
/// use declarest::model::only_id;
/// use serde_json::json;
///
/// assert_eq!(only_id(&json!({"id": 3, "name": "x"})), json!(3));
/// assert_eq!(only_id(&json!([{"id": "a"}, {"name": "b"}])), json!(["a", {"name": "b"}]));
/// ```
pub fn only_id(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(only_id).collect()),
        Value::Object(map) => match map.get("id") {
            Some(id) if !is_falsy(id) => id.clone(),
            _ => value.clone(),
        },
        other => other.clone(),
    }
}

/// Keeps only the given keys on each object, element-wise for arrays.
pub fn strip(value: &Value, keys: &[&str]) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(|item| strip(item, keys)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| keys.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Map<_, _>>(),
        ),
        other => other.clone(),
    }
}

/// Removes every `id` key, recursively.
pub fn strip_ids(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(strip_ids).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != "id")
                .map(|(key, value)| (key.clone(), strip_ids(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Returns `true` if `s` looks like a 24 character hexadecimal object id.
pub fn is_id(s: &str) -> bool {
    OBJECT_ID.is_match(s)
}
