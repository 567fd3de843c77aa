//! Models: JSON-backed data holders and the registry that binds model names
//! used in endpoint definitions to constructors.

mod base;
mod registry;
mod value;

use std::fmt;

use serde_json::{Map, Value};

pub use base::BaseModel;
pub use registry::{BASE_MODEL, ModelFactory, ModelRegistry};
pub use value::{INTERNAL_PREFIX, is_falsy, is_id, only_id, strip, strip_ids, value_to_json};

/// A data holder that can be sent as a request body and built from
/// response data.
///
/// Implementors expose their properties as a JSON object map. The default
/// [`to_json`](Model::to_json) exports that map without `$$`-prefixed keys.
pub trait Model: fmt::Debug + Send + Sync {
    /// Returns the model's raw properties.
    fn fields(&self) -> &Map<String, Value>;

    /// Exports the model as a JSON value for request bodies.
    fn to_json(&self) -> Value {
        value_to_json(&Value::Object(self.fields().clone()))
    }
}
