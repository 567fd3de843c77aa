//! Endpoint, action and model configuration errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::name::NameError;

/// Errors in API, endpoint or action configuration.
///
/// These errors occur while the API is being assembled, typically
/// indicating programmer errors or an invalid configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Endpoint or action name validation failed.
    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),

    /// An action or endpoint references a model that was never registered.
    #[error("Unknown model class: {model}")]
    UnknownModel {
        /// The model name that could not be resolved.
        model: String,
    },

    /// No endpoint was registered under this name.
    #[error("Unknown endpoint: {name}")]
    UnknownEndpoint {
        /// The requested endpoint name.
        name: String,
    },

    /// The endpoint has no action with this name.
    #[error("Unknown action {action} on endpoint {endpoint}")]
    UnknownAction {
        /// The endpoint that was searched.
        endpoint: String,
        /// The requested action name.
        action: String,
    },

    /// An action was called on an API built without a transport.
    #[error("No transport configured; requests can be rendered but not sent")]
    NoTransport,

    /// YAML configuration could not be parsed.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON configuration could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Creates an unknown model error.
    pub fn unknown_model(model: impl Into<String>) -> Self {
        Self::UnknownModel {
            model: model.into(),
        }
    }

    /// Creates an unknown action error.
    pub fn unknown_action(endpoint: impl Into<String>, action: impl Into<String>) -> Self {
        Self::UnknownAction {
            endpoint: endpoint.into(),
            action: action.into(),
        }
    }
}
