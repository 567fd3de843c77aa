//! Provider defaults and declarative API configuration files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::action::ActionConfig;
use crate::endpoint::EndpointConfig;
use crate::error::ConfigError;
use crate::method::RestMethod;
use crate::template::{ParamSet, param_set};

/// Settings every endpoint inherits unless it overrides them.
///
/// The defaults describe a conventional REST resource: `query`, `get`,
/// `create`, `update` and `delete` actions at `<base_url>/<name>/:id`, with
/// `id` taken from the request payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiDefaults {
    /// Log each endpoint's merged configuration at setup.
    pub verbose: bool,
    pub base_url: String,
    /// Replace mismatched response shapes with an empty value.
    pub enforce_data_format: bool,
    pub strip_trailing_slashes: bool,
    pub model: Option<String>,
    pub params: ParamSet,
    #[serde(deserialize_with = "deserialize_actions")]
    pub actions: BTreeMap<String, ActionConfig>,
}

impl Default for ApiDefaults {
    fn default() -> Self {
        Self {
            verbose: false,
            base_url: "/".to_string(),
            enforce_data_format: false,
            strip_trailing_slashes: true,
            model: None,
            params: param_set([("id", "@id")]),
            actions: default_actions(),
        }
    }
}

/// The stock action set.
pub fn default_actions() -> BTreeMap<String, ActionConfig> {
    BTreeMap::from([
        (
            "query".to_string(),
            ActionConfig::new(RestMethod::Get).array().returns_model(),
        ),
        (
            "get".to_string(),
            ActionConfig::new(RestMethod::Get).returns_model(),
        ),
        ("create".to_string(), ActionConfig::new(RestMethod::Post)),
        ("update".to_string(), ActionConfig::new(RestMethod::Put)),
        ("delete".to_string(), ActionConfig::new(RestMethod::Delete)),
    ])
}

/// Action tables may list an action with no body (`archive: ~`); it gets a
/// default configuration.
pub(crate) fn deserialize_actions<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, ActionConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Option<ActionConfig>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, config)| (name, config.unwrap_or_default()))
        .collect())
}

pub(crate) fn deserialize_actions_opt<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, ActionConfig>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<ActionConfig>>>::deserialize(deserializer)?;
    Ok(raw.map(|actions| {
        actions
            .into_iter()
            .map(|(name, config)| (name, config.unwrap_or_default()))
            .collect()
    }))
}

/// A complete API definition as read from a configuration file.
///
/// ## Examples
///
/// ```rust
/// use declarest::ApiConfig;
///
/// let config = ApiConfig::from_yaml_str(r#"
/// defaults:
///   base_url: /api
/// endpoints:
///   users: {}
///   posts:
///     url: users/:user/posts/:id
///     params:
///       user: '@author.id'
/// "#).unwrap();
///
/// assert_eq!(config.defaults.base_url, "/api");
/// assert_eq!(config.endpoints.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub defaults: ApiDefaults,
    #[serde(deserialize_with = "deserialize_endpoints")]
    pub endpoints: BTreeMap<String, EndpointConfig>,
}

fn deserialize_endpoints<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, EndpointConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Option<EndpointConfig>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, config)| (name, config.unwrap_or_default()))
        .collect())
}

impl ApiConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads a configuration file; `.json` files are parsed as JSON,
    /// anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }
}
