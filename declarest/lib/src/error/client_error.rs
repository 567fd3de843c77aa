//! Transport and HTTP errors.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::request::RequestConfig;

/// A rejected response, carried back to the caller unchanged.
///
/// Holds the status, headers and decoded body of the failed response along
/// with the request descriptor that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers (lower-cased names).
    pub headers: BTreeMap<String, String>,
    /// Decoded response body; JSON when it parses, otherwise a string.
    pub data: Value,
    /// The request that was rejected.
    pub config: RequestConfig,
}

/// Errors from the transport layer.
///
/// Pending requests are shared between identical callers by the duplicate
/// filter, so this type is `Clone` and keeps no live `reqwest` handles.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The request could not be sent (network, TLS, invalid URL).
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Request exceeded the configured timeout.
    #[error("Request timeout after {duration_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        duration_ms: u64,
    },

    /// Server returned a non-success HTTP status code.
    #[error("HTTP {} for {} {}", .0.status, .0.config.method, .0.config.url)]
    HttpStatus(ErrorResponse),

    /// An identical request was already in flight and rejection was requested.
    #[error("Duplicate request rejected with status {}: {} {}", .0.status, .0.config.method, .0.config.url)]
    DuplicateRequest(ErrorResponse),
}

impl ClientError {
    /// Returns the HTTP status code if this error carries a response.
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }

    /// Returns the rejected response, if there is one.
    pub fn response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::HttpStatus(r) | Self::DuplicateRequest(r) => Some(r),
            _ => None,
        }
    }

    /// Maps a `reqwest` failure onto a clonable client error.
    pub(crate) fn from_reqwest(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                duration_ms: timeout_ms,
            }
        } else {
            Self::Connection(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::RestMethod;

    fn rejected(status: u16) -> ErrorResponse {
        ErrorResponse {
            status,
            headers: BTreeMap::new(),
            data: Value::String(String::new()),
            config: RequestConfig::new(RestMethod::Get, "/users/1"),
        }
    }

    #[test]
    fn test_status_code_extraction() {
        let err = ClientError::HttpStatus(rejected(404));
        assert_eq!(err.status_code(), Some(404));

        let timeout = ClientError::Timeout { duration_ms: 1000 };
        assert_eq!(timeout.status_code(), None);
    }

    #[test]
    fn test_http_status_display() {
        let err = ClientError::HttpStatus(rejected(500));
        assert_eq!(err.to_string(), "HTTP 500 for GET /users/1");
    }

    #[test]
    fn test_duplicate_request_carries_response() {
        let err = ClientError::DuplicateRequest(rejected(409));
        assert_eq!(err.response().map(|r| r.status), Some(409));
        assert!(err.to_string().contains("Duplicate request"));
    }
}
