//! Top-level API error type.

use super::{ClientError, ConfigError, PathError, ValidationError};
use thiserror::Error;

/// Top-level error type for all declarest operations.
///
/// This enum aggregates all error categories, enabling unified error handling
/// while preserving the ability to match on specific error types when needed.
///
/// ## Examples
///
/// ```rust,ignore
/// use declarest::ApiError;
///
/// fn handle_error(err: ApiError) {
///     match err {
///         ApiError::Client(e) => eprintln!("Request failed: {e}"),
///         ApiError::Path(e) => eprintln!("Bad template: {e}"),
///         ApiError::Config(e) => eprintln!("Configuration error: {e}"),
///         ApiError::Validation(e) => eprintln!("Invalid response: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport errors (network, HTTP status, duplicate rejection).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Dotted-path or URL template errors.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Endpoint, action or model configuration errors.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Response conversion errors.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    /// Returns the HTTP status code carried by a transport error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Client(e) => e.status_code(),
            _ => None,
        }
    }
}
