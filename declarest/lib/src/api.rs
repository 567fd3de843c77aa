//! The API: a set of endpoints built from shared defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::action::ActionConfig;
use crate::config::{ApiConfig, ApiDefaults};
use crate::endpoint::{Endpoint, EndpointConfig};
use crate::error::ConfigError;
use crate::model::ModelRegistry;
use crate::template::ParamSet;
use crate::transport::Transport;

/// Collects defaults and endpoint registrations, then builds an [`Api`].
///
/// ## Examples
///
/// ```rust
/// use declarest::{Api, EndpointConfig};
///
/// let api = Api::builder()
///     .base_url("/api")
///     .register_endpoint("users", EndpointConfig::default())
///     .register_endpoint("posts", EndpointConfig::default().url("users/:user/posts/:id"))
///     .build()
///     .unwrap();
///
/// assert_eq!(api.endpoint("users").unwrap().url(), "/api/users/:id");
/// assert_eq!(api.endpoint("posts").unwrap().url(), "/api/users/:user/posts/:id");
/// ```
#[derive(Default)]
pub struct ApiBuilder {
    defaults: ApiDefaults,
    endpoints: BTreeMap<String, EndpointConfig>,
    models: ModelRegistry,
    transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for ApiBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiBuilder")
            .field("defaults", &self.defaults)
            .field("endpoints", &self.endpoints.keys().collect::<Vec<_>>())
            .field("models", &self.models)
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

impl ApiBuilder {
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.defaults.verbose = verbose;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.defaults.base_url = url.into();
        self
    }

    pub fn enforce_data_format(mut self, enforce: bool) -> Self {
        self.defaults.enforce_data_format = enforce;
        self
    }

    /// Replaces the default action table.
    pub fn default_actions(mut self, actions: BTreeMap<String, ActionConfig>) -> Self {
        self.defaults.actions = actions;
        self
    }

    /// Replaces the default parameter templates.
    pub fn default_params(mut self, params: ParamSet) -> Self {
        self.defaults.params = params;
        self
    }

    /// Sets the default model; an empty name clears it.
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.defaults.model = (!model.is_empty()).then_some(model);
        self
    }

    pub fn strip_trailing_slashes(mut self, strip: bool) -> Self {
        self.defaults.strip_trailing_slashes = strip;
        self
    }

    /// Registers an endpoint, replacing any earlier registration of `name`.
    pub fn register_endpoint(mut self, name: impl Into<String>, config: EndpointConfig) -> Self {
        let name = name.into();
        if self.endpoints.insert(name.clone(), config).is_some() {
            warn!(endpoint = %name, "API endpoint is being overwritten");
        }
        self
    }

    /// Takes defaults and endpoints from a configuration file.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.defaults = config.defaults;
        for (name, endpoint) in config.endpoints {
            self = self.register_endpoint(name, endpoint);
        }
        self
    }

    pub fn models(mut self, models: ModelRegistry) -> Self {
        self.models = models;
        self
    }

    /// Sets the transport actions are sent through. Without one, requests
    /// can be rendered but not sent.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Builds every registered endpoint.
    ///
    /// ## Errors
    ///
    /// Returns the first [`ConfigError`] raised by an endpoint.
    pub fn build(self) -> Result<Api, ConfigError> {
        let endpoints = self
            .endpoints
            .into_iter()
            .map(|(name, config)| {
                let endpoint = Endpoint::new(
                    &name,
                    config,
                    &self.defaults,
                    &self.models,
                    self.transport.clone(),
                )?;
                Ok((name, endpoint))
            })
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        debug!(endpoints = endpoints.len(), "API built");
        Ok(Api {
            defaults: self.defaults,
            endpoints,
        })
    }
}

/// A built API: endpoints by name.
#[derive(Debug)]
pub struct Api {
    defaults: ApiDefaults,
    endpoints: BTreeMap<String, Endpoint>,
}

impl Api {
    pub fn builder() -> ApiBuilder {
        ApiBuilder::default()
    }

    /// Builds an API from a configuration file's contents.
    pub fn from_config(
        config: ApiConfig,
        models: ModelRegistry,
        transport: impl Transport + 'static,
    ) -> Result<Self, ConfigError> {
        Self::builder()
            .config(config)
            .models(models)
            .transport(transport)
            .build()
    }

    /// Looks up an endpoint by name.
    pub fn endpoint(&self, name: &str) -> Result<&Endpoint, ConfigError> {
        self.endpoints
            .get(name)
            .ok_or_else(|| ConfigError::UnknownEndpoint {
                name: name.to_string(),
            })
    }

    /// Endpoints in name order.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }

    pub fn defaults(&self) -> &ApiDefaults {
        &self.defaults
    }
}
