//! Result values of an action call.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ValidationError;
use crate::model::Model;

/// Output of a successful action call.
///
/// Actions that expect a model return [`Model`](ApiResponse::Model) or
/// [`Models`](ApiResponse::Models); every other action returns the raw
/// (shape-checked) response data.
///
/// ## Examples
///
/// ```rust
/// use declarest::ApiResponse;
/// use serde_json::json;
///
/// #[derive(serde::Deserialize)]
/// struct User { name: String }
///
/// let response = ApiResponse::Raw(json!({"name": "Ann"}));
/// let user: User = response.deserialize().unwrap();
/// assert_eq!(user.name, "Ann");
/// ```
#[derive(Debug)]
pub enum ApiResponse {
    /// Response data without model conversion.
    Raw(Value),
    /// A single model instance.
    Model(Box<dyn Model>),
    /// One model instance per element of an array response.
    Models(Vec<Box<dyn Model>>),
}

impl ApiResponse {
    /// Returns `true` if the response was converted to model(s).
    pub fn is_model(&self) -> bool {
        matches!(self, Self::Model(_) | Self::Models(_))
    }

    /// Attempt to get the raw value, returning `None` for model responses.
    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Self::Raw(v) => Some(v),
            _ => None,
        }
    }

    /// Attempt to get the single model, returning `None` otherwise.
    pub fn as_model(&self) -> Option<&dyn Model> {
        match self {
            Self::Model(m) => Some(m.as_ref()),
            _ => None,
        }
    }

    /// Attempt to get the model list, returning `None` otherwise.
    pub fn as_models(&self) -> Option<&[Box<dyn Model>]> {
        match self {
            Self::Models(m) => Some(m),
            _ => None,
        }
    }

    /// Convert into the raw value, returning `Err(self)` for model responses.
    pub fn into_raw(self) -> Result<Value, Self> {
        match self {
            Self::Raw(v) => Ok(v),
            other => Err(other),
        }
    }

    /// Exports the response as JSON, going through [`Model::to_json`] for
    /// model responses.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Raw(v) => v.clone(),
            Self::Model(m) => m.to_json(),
            Self::Models(models) => Value::Array(models.iter().map(|m| m.to_json()).collect()),
        }
    }

    /// Deserializes the exported JSON into a caller-chosen type.
    ///
    /// ## Errors
    ///
    /// Returns [`ValidationError::JsonParse`] if the data does not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ValidationError> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}
