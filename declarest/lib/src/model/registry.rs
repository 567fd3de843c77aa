//! Name to constructor bindings for models.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::{BaseModel, Model};
use crate::error::ConfigError;

/// Name under which [`BaseModel`] is registered by default.
pub const BASE_MODEL: &str = "BaseModel";

/// Builds a model instance from response data.
pub type ModelFactory = Arc<dyn Fn(Value) -> Box<dyn Model> + Send + Sync>;

/// Explicit registry of model constructors, populated at startup.
///
/// Endpoint and action definitions refer to models by name; the names are
/// resolved against this registry when the API is built, so a typo fails
/// fast with [`ConfigError::UnknownModel`].
///
/// ## Examples
///
/// ```rust
/// use declarest::model::{BaseModel, ModelRegistry};
///
/// let registry = ModelRegistry::default().with("User", BaseModel::new);
/// assert!(registry.contains("User"));
/// assert!(registry.contains("BaseModel"));
/// assert!(registry.factory("Group").is_err());
/// ```
#[derive(Clone)]
pub struct ModelRegistry {
    factories: BTreeMap<String, ModelFactory>,
}

impl ModelRegistry {
    /// Creates a registry with no models at all.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registers a constructor under `name`, replacing any previous one.
    pub fn register<M, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        M: Model + 'static,
        F: Fn(Value) -> M + Send + Sync + 'static,
    {
        let factory: ModelFactory = Arc::new(move |data| -> Box<dyn Model> { Box::new(factory(data)) });
        self.factories.insert(name.into(), factory);
        self
    }

    /// Chained form of [`register`](Self::register).
    pub fn with<M, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        M: Model + 'static,
        F: Fn(Value) -> M + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the constructor registered under `name`.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::UnknownModel`] if nothing is registered.
    pub fn factory(&self, name: &str) -> Result<ModelFactory, ConfigError> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::unknown_model(name))
    }

    /// Instantiates the model registered under `name`.
    pub fn create(&self, name: &str, data: Value) -> Result<Box<dyn Model>, ConfigError> {
        let factory = self.factory(name)?;
        Ok(factory(data))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::empty().with(BASE_MODEL, BaseModel::new)
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
