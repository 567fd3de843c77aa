//! JSON-backed general purpose model.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::value::{INTERNAL_PREFIX, is_falsy, value_to_json};
use super::Model;

static ISO_DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})").expect("Invalid regex")
});

/// A plain data holder with JSON import/export.
///
/// Properties live in a JSON object map; importing merges keys, exporting
/// drops framework-internal `$$` keys.
///
/// ## Examples
///
/// ```rust
/// use declarest::model::{BaseModel, Model};
/// use serde_json::json;
///
/// let mut user = BaseModel::new(json!({"id": 1, "name": "Ann"}));
/// user.set("email", "ann@example.com");
///
/// assert_eq!(user.id(), Some(&json!(1)));
/// assert_eq!(user.to_json()["email"], json!("ann@example.com"));
///
/// let copy = user.clone_model(true);
/// assert_eq!(copy.id(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseModel {
    fields: Map<String, Value>,
}

impl BaseModel {
    /// Creates a model from JSON data; non-object data yields an empty model.
    pub fn new(data: Value) -> Self {
        let mut model = Self::default();
        model.load(data);
        model
    }

    /// Copies every key of an object onto the model, overwriting existing keys.
    pub fn load(&mut self, data: Value) -> &mut Self {
        if let Value::Object(map) = data {
            self.fields.extend(map);
        }
        self
    }

    /// Exports the model with `overrides` taking precedence over own keys.
    pub fn to_json_with(&self, overrides: &Value) -> Value {
        let mut json = match value_to_json(overrides) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in &self.fields {
            if !json.contains_key(key) && !key.starts_with(INTERNAL_PREFIX) {
                json.insert(key.clone(), value_to_json(value));
            }
        }
        Value::Object(json)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn id(&self) -> Option<&Value> {
        self.fields.get("id")
    }

    /// Copies a subset of properties; an empty list copies all public ones.
    pub fn extract(&self, properties: &[&str]) -> Map<String, Value> {
        if properties.is_empty() {
            return self
                .fields
                .iter()
                .filter(|(key, _)| !key.starts_with(INTERNAL_PREFIX))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
        }
        properties
            .iter()
            .map(|key| {
                let value = self.fields.get(*key).cloned().unwrap_or(Value::Null);
                ((*key).to_string(), value)
            })
            .collect()
    }

    pub fn extract_one(&self, key: &str) -> Option<Value> {
        self.fields.get(key).cloned()
    }

    /// Merges the keys of an object into the model.
    pub fn merge(&mut self, data: &Value) {
        if let Value::Object(map) = data {
            for (key, value) in map {
                self.fields.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Returns a copy of the model, optionally without its `id`.
    pub fn clone_model(&self, strip_id: bool) -> Self {
        let mut clone = Self {
            fields: self.extract(&[]),
        };
        if strip_id {
            clone.fields.remove("id");
        }
        clone
    }

    /// Compares identities: against another object by `id`, otherwise
    /// against the raw id value.
    pub fn is_same(&self, other: &Value) -> bool {
        match other {
            Value::Object(map) => match (self.id(), map.get("id")) {
                (Some(a), Some(b)) => !is_falsy(a) && a == b,
                _ => false,
            },
            other => self.id() == Some(other),
        }
    }

    /// Reads a property as an ISO-8601 date-time.
    ///
    /// Values without an offset are taken as UTC.
    pub fn date(&self, key: &str) -> Option<DateTime<FixedOffset>> {
        let raw = self.fields.get(key)?.as_str()?;
        if !ISO_DATE_TIME.is_match(raw) {
            return None;
        }
        DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc().fixed_offset())
        })
    }
}

impl Model for BaseModel {
    fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Value> for BaseModel {
    fn from(data: Value) -> Self {
        Self::new(data)
    }
}
