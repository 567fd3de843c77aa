//! Response conversion errors.

use thiserror::Error;

/// Errors while converting a response payload into a caller-chosen type.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// JSON (de)serialization failed.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ValidationError {
    /// Returns `true` if this is a parsing error.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::JsonParse(_))
    }
}
