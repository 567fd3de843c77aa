//! Endpoints: a named resource URL with a set of actions.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::action::{Action, ActionConfig, ActionContext};
use crate::config::{ApiDefaults, deserialize_actions_opt};
use crate::error::{ApiError, ConfigError};
use crate::model::ModelRegistry;
use crate::name::Name;
use crate::request::{Payload, RequestConfig, build_request_config, normalize_arguments};
use crate::response::ApiResponse;
use crate::template::{ParamSet, concat_url};
use crate::transport::Transport;

/// Declarative description of an endpoint.
///
/// Unset fields take the API defaults. `actions` and `params` replace the
/// default tables unless the matching `merge_default_*` switch is on, in
/// which case they extend them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointConfig {
    pub base_url: Option<String>,
    /// URL relative to the base URL; `<name>/:id` when unset.
    pub url: Option<String>,
    #[serde(deserialize_with = "deserialize_actions_opt")]
    pub actions: Option<BTreeMap<String, ActionConfig>>,
    pub params: Option<ParamSet>,
    pub model: Option<String>,
    pub enforce_data_format: Option<bool>,
    pub strip_trailing_slashes: Option<bool>,
    pub verbose: Option<bool>,
    pub merge_default_actions: bool,
    pub merge_default_params: bool,
}

impl EndpointConfig {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn params(mut self, params: ParamSet) -> Self {
        self.params = Some(params);
        self
    }

    /// Adds an action, keeping any actions configured so far.
    pub fn action(mut self, name: impl Into<String>, action: ActionConfig) -> Self {
        self.actions
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), action);
        self
    }

    /// Keeps the default actions next to the configured ones.
    pub fn merge_default_actions(mut self) -> Self {
        self.merge_default_actions = true;
        self
    }

    /// Keeps the default params next to the configured ones.
    pub fn merge_default_params(mut self) -> Self {
        self.merge_default_params = true;
        self
    }

    pub fn enforce_data_format(mut self, enforce: bool) -> Self {
        self.enforce_data_format = Some(enforce);
        self
    }

    pub fn strip_trailing_slashes(mut self, strip: bool) -> Self {
        self.strip_trailing_slashes = Some(strip);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }
}

/// A resource with its resolved actions.
///
/// Actions are called by name through [`call`](Endpoint::call); the stock
/// action names have shorthands.
pub struct Endpoint {
    name: String,
    url: String,
    model: Option<String>,
    actions: BTreeMap<String, Action>,
    transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("model", &self.model)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

impl Endpoint {
    /// Merges `config` over the API defaults and resolves every action.
    ///
    /// ## Errors
    ///
    /// Returns a [`ConfigError`] for an invalid endpoint or action name or a
    /// model that is not registered.
    pub fn new(
        name: &str,
        config: EndpointConfig,
        defaults: &ApiDefaults,
        models: &ModelRegistry,
        transport: Option<Arc<dyn Transport>>,
    ) -> Result<Self, ConfigError> {
        let name = Name::new(name)?;

        let base_url = config.base_url.as_deref().unwrap_or(&defaults.base_url);
        let url = match config.url.as_deref() {
            Some(url) => concat_url(base_url, url),
            None => concat_url(base_url, &concat_url(name.as_str(), ":id")),
        };

        let params = merge_table(&defaults.params, config.params, config.merge_default_params);
        let actions = merge_table(&defaults.actions, config.actions, config.merge_default_actions);
        let model = config
            .model
            .or_else(|| defaults.model.clone())
            .filter(|model| !model.is_empty());
        let enforce_data_format = config
            .enforce_data_format
            .unwrap_or(defaults.enforce_data_format);
        let strip_trailing_slashes = config
            .strip_trailing_slashes
            .unwrap_or(defaults.strip_trailing_slashes);

        if let Some(model) = &model {
            models.factory(model)?;
        }

        if config.verbose.unwrap_or(defaults.verbose) {
            info!(
                endpoint = %name,
                url = %url,
                model = ?model,
                params = ?params.keys().collect::<Vec<_>>(),
                actions = ?actions.keys().collect::<Vec<_>>(),
                enforce_data_format,
                strip_trailing_slashes,
                "API endpoint"
            );
        }
        debug!(endpoint = %name, url = %url, "Setting up endpoint");

        let context = ActionContext {
            url: &url,
            model: model.as_deref(),
            params: &params,
            enforce_data_format,
            strip_trailing_slashes,
        };
        let actions = actions
            .into_iter()
            .map(|(key, action)| {
                let key = Name::new(key)?;
                let action = Action::new(key.as_str(), action, context, models)?;
                Ok((String::from(key), action))
            })
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        Ok(Self {
            name: name.into(),
            url,
            model,
            actions,
            transport,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full URL template of the endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Looks up an action by name.
    pub fn action(&self, name: &str) -> Result<&Action, ConfigError> {
        self.actions
            .get(name)
            .ok_or_else(|| ConfigError::unknown_action(&self.name, name))
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.values()
    }

    /// Renders an action call into a request without sending it.
    pub fn request_config(
        &self,
        action: &str,
        params: Option<Map<String, Value>>,
        data: Option<Payload>,
    ) -> Result<RequestConfig, ApiError> {
        let action = self.action(action)?;
        let (params, data) = normalize_arguments(action, params, data);
        Ok(build_request_config(action, params.as_ref(), data.as_ref())?)
    }

    /// Calls an action.
    ///
    /// The request is rendered from the action's templates, `params` and
    /// `data`, sent through the transport and the outcome passed to the
    /// action's interceptors. Actions expecting a model convert the result.
    ///
    /// ## Errors
    ///
    /// Returns an error if the action is unknown, the URL template is
    /// invalid, no transport is configured, or the request fails and the
    /// action's error interceptor does not recover.
    pub async fn call(
        &self,
        action: &str,
        params: Option<Map<String, Value>>,
        data: Option<Payload>,
    ) -> Result<ApiResponse, ApiError> {
        let action = self.action(action)?;
        let transport = self.transport.as_ref().ok_or(ConfigError::NoTransport)?;

        let (params, data) = normalize_arguments(action, params, data);
        let request = build_request_config(action, params.as_ref(), data.as_ref())?;
        debug!(
            endpoint = %self.name,
            action = %action.name(),
            method = %request.method,
            url = %request.url,
            "Calling action"
        );

        let raw = match transport.send(request).await {
            Ok(response) => action.intercept_success(response)?,
            Err(err) => action.intercept_error(err)?,
        };
        Ok(action.finish(raw))
    }

    /// Calls `query`; `params` should be an object (anything else is ignored).
    pub async fn query(&self, params: Value) -> Result<ApiResponse, ApiError> {
        self.call("query", into_object(params), None).await
    }

    /// Calls `get`.
    pub async fn get(&self, params: Value) -> Result<ApiResponse, ApiError> {
        self.call("get", into_object(params), None).await
    }

    /// Calls `create` with `data` as the body.
    pub async fn create(&self, data: impl Into<Payload>) -> Result<ApiResponse, ApiError> {
        self.call("create", None, Some(data.into())).await
    }

    /// Calls `update` with `data` as the body.
    pub async fn update(&self, data: impl Into<Payload>) -> Result<ApiResponse, ApiError> {
        self.call("update", None, Some(data.into())).await
    }

    /// Calls `delete`.
    pub async fn delete(&self, params: Value) -> Result<ApiResponse, ApiError> {
        self.call("delete", into_object(params), None).await
    }
}

fn into_object(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn merge_table<V: Clone>(
    defaults: &BTreeMap<String, V>,
    configured: Option<BTreeMap<String, V>>,
    merge: bool,
) -> BTreeMap<String, V> {
    match configured {
        Some(configured) if merge => {
            let mut merged = defaults.clone();
            merged.extend(configured);
            merged
        }
        Some(configured) => configured,
        None => defaults.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::RestMethod;
    use crate::template::param_set;
    use serde_json::json;

    fn endpoint(name: &str, config: EndpointConfig) -> Endpoint {
        Endpoint::new(name, config, &ApiDefaults::default(), &ModelRegistry::default(), None)
            .unwrap()
    }

    #[test]
    fn test_default_url_and_actions() {
        let users = endpoint("users", EndpointConfig::default());
        assert_eq!(users.url(), "/users/:id");
        let names: Vec<_> = users.actions().map(Action::name).collect();
        assert_eq!(names, ["create", "delete", "get", "query", "update"]);
        assert_eq!(users.action("delete").unwrap().method(), RestMethod::Delete);
    }

    #[test]
    fn test_custom_url_and_base() {
        let posts = endpoint(
            "posts",
            EndpointConfig::default()
                .base_url("/api/v1")
                .url("users/:user/posts/:id"),
        );
        assert_eq!(posts.url(), "/api/v1/users/:user/posts/:id");
    }

    #[test]
    fn test_configured_actions_replace_defaults() {
        let reports = endpoint(
            "reports",
            EndpointConfig::default().action("run", ActionConfig::new(RestMethod::Post).url("run")),
        );
        let names: Vec<_> = reports.actions().map(Action::name).collect();
        assert_eq!(names, ["run"]);
        assert_eq!(reports.action("run").unwrap().url(), "/reports/:id/run");
    }

    #[test]
    fn test_merge_default_actions() {
        let reports = endpoint(
            "reports",
            EndpointConfig::default()
                .action("run", ActionConfig::new(RestMethod::Post))
                .merge_default_actions(),
        );
        assert_eq!(reports.actions().count(), 6);
    }

    #[test]
    fn test_params_merge() {
        let replaced = endpoint(
            "things",
            EndpointConfig::default().params(param_set([("kind", "@kind")])),
        );
        let request = replaced
            .request_config("get", None, Some(Payload::Json(json!({"id": 1, "kind": "x"}))))
            .unwrap();
        assert_eq!(request.url, "/things");
        assert_eq!(request.params, json!({"kind": "x"}).as_object().cloned());

        let merged = endpoint(
            "things",
            EndpointConfig::default()
                .params(param_set([("kind", "@kind")]))
                .merge_default_params(),
        );
        let request = merged
            .request_config("get", None, Some(Payload::Json(json!({"id": 1, "kind": "x"}))))
            .unwrap();
        assert_eq!(request.url, "/things/1");
        assert_eq!(request.params, json!({"kind": "x"}).as_object().cloned());
    }

    #[test]
    fn test_strip_trailing_slashes_inherited_by_actions() {
        let things = endpoint("things", EndpointConfig::default().strip_trailing_slashes(false));
        let request = things.request_config("query", None, None).unwrap();
        assert_eq!(request.url, "/things/");
    }

    #[test]
    fn test_params_become_body_for_create() {
        let users = endpoint("users", EndpointConfig::default());
        let request = users
            .request_config("create", json!({"name": "Ann"}).as_object().cloned(), None)
            .unwrap();
        assert_eq!(request.method, RestMethod::Post);
        assert_eq!(request.url, "/users");
        assert_eq!(request.data, Some(json!({"name": "Ann"})));
        assert_eq!(request.params, None);
    }

    #[test]
    fn test_unknown_action() {
        let users = endpoint("users", EndpointConfig::default());
        let err = users.request_config("archive", None, None).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Config(ConfigError::UnknownAction { .. })
        ));
    }

    #[test]
    fn test_unknown_model_fails_at_construction() {
        let err = Endpoint::new(
            "users",
            EndpointConfig::default().model("User"),
            &ApiDefaults::default(),
            &ModelRegistry::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownModel { .. }));
    }

    #[test]
    fn test_invalid_name() {
        let err = Endpoint::new(
            "1users",
            EndpointConfig::default(),
            &ApiDefaults::default(),
            &ModelRegistry::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidName(_)));
    }

    #[tokio::test]
    async fn test_call_without_transport() {
        let users = endpoint("users", EndpointConfig::default());
        let err = users.get(json!({"id": 1})).await.unwrap_err();
        assert!(matches!(err, ApiError::Config(ConfigError::NoTransport)));
    }

    #[test]
    fn test_deserialize_config() {
        let config: EndpointConfig = serde_yaml::from_str(
            "url: users/:user/posts/:id\nmodel: BaseModel\nmerge_default_actions: true\nactions:\n  publish:\n    method: POST\n    url: publish\n  archive: ~\n",
        )
        .unwrap();
        assert!(config.merge_default_actions);
        let actions = config.actions.unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions["publish"].method, Some(RestMethod::Post));
    }
}
