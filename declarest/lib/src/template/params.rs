//! Parameter templates and the combiner that resolves them per call.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::dotted_path::lookup_dotted_path;
use crate::error::PathError;

/// Prefix marking a parameter template as a lookup into the request payload.
pub const PATH_PREFIX: char = '@';

/// A zero-argument producer evaluated each time parameters are combined.
#[derive(Clone)]
pub struct ParamFn(Arc<dyn Fn() -> Value + Send + Sync>);

impl ParamFn {
    pub fn new(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    fn call(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for ParamFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParamFn(..)")
    }
}

/// A declared parameter value on an action or endpoint.
///
/// ## Examples
///
/// ```rust
/// use declarest::template::ParamValue;
/// use serde_json::json;
///
/// assert_eq!(ParamValue::from("@id"), ParamValue::Path("id".to_string()));
/// assert_eq!(ParamValue::from("json"), ParamValue::Literal(json!("json")));
/// ```
#[derive(Debug, Clone)]
pub enum ParamValue {
    /// Used as-is.
    Literal(Value),
    /// Dotted path looked up in the request payload.
    Path(String),
    /// Produced by a function at combine time.
    Computed(ParamFn),
}

impl ParamValue {
    /// Creates a computed parameter.
    pub fn computed(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self::Computed(ParamFn::new(f))
    }

    /// Resolves this template against the request payload.
    ///
    /// Functions are called first; a resulting string starting with `@` is
    /// then looked up as a dotted path. `Ok(None)` means the value is absent.
    pub fn resolve(&self, data: Option<&Value>) -> Result<Option<Value>, PathError> {
        let value = match self {
            Self::Path(path) => return Ok(lookup_dotted_path(data, path)?.cloned()),
            Self::Literal(value) => value.clone(),
            Self::Computed(f) => f.call(),
        };

        match value {
            Value::String(s) if s.starts_with(PATH_PREFIX) => {
                Ok(lookup_dotted_path(data, &s[PATH_PREFIX.len_utf8()..])?.cloned())
            }
            other => Ok(Some(other)),
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Path(a), Self::Path(b)) => a == b,
            (Self::Computed(a), Self::Computed(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => s.as_str().into(),
            other => Self::Literal(other),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        match value.strip_prefix(PATH_PREFIX) {
            Some(path) => Self::Path(path.to_string()),
            None => Self::Literal(Value::String(value.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

/// Declared parameters keyed by name.
pub type ParamSet = BTreeMap<String, ParamValue>;

/// Builds a [`ParamSet`] from `(name, template)` pairs.
pub fn param_set<I, K, V>(pairs: I) -> ParamSet
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ParamValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Combines declared parameter templates with caller-supplied parameters.
///
/// Declared templates are resolved against `data`; those resolving to an
/// absent value contribute no key. Caller parameters are then laid over the
/// result and always win.
///
/// ## Errors
///
/// Returns a [`PathError`] if a declared `@path` is not a valid dotted path.
///
/// ## Examples
///
/// ```rust
/// use declarest::template::{combine_params, param_set};
/// use serde_json::json;
///
/// let declared = param_set([("id", "@id")]);
/// let given = json!({"id": 9});
/// let data = json!({"id": 7});
///
/// let combined = combine_params(&declared, given.as_object(), Some(&data)).unwrap();
/// assert_eq!(combined.get("id"), Some(&json!(9)));
/// ```
pub fn combine_params(
    declared: &ParamSet,
    given: Option<&Map<String, Value>>,
    data: Option<&Value>,
) -> Result<Map<String, Value>, PathError> {
    let mut combined = Map::new();

    for (key, template) in declared {
        if let Some(value) = template.resolve(data)? {
            combined.insert(key.clone(), value);
        }
    }

    if let Some(given) = given {
        for (key, value) in given {
            combined.insert(key.clone(), value.clone());
        }
    }

    Ok(combined)
}
