//! Dotted-path and URL template errors.

use thiserror::Error;

/// Errors raised while resolving dotted paths or scanning URL templates.
///
/// These are programmer errors in endpoint definitions and are raised
/// synchronously, before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The dotted path is empty or does not match `segment(.segment)*`.
    #[error("Invalid dotted path: {path}")]
    InvalidDottedPath {
        /// The offending path.
        path: String,
    },

    /// A path or URL parameter uses a reserved name.
    #[error("Invalid parameter name: {name}")]
    ReservedName {
        /// The reserved name that was used.
        name: String,
    },
}

impl PathError {
    /// Creates an invalid dotted path error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidDottedPath { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_display() {
        let err = PathError::invalid_path("a..b");
        assert_eq!(err.to_string(), "Invalid dotted path: a..b");
    }

    #[test]
    fn test_reserved_name_display() {
        let err = PathError::ReservedName {
            name: "hasOwnProperty".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid parameter name: hasOwnProperty");
    }
}
