//! Layered error types for the declarest crate.
//!
//! The error hierarchy is structured for actionable diagnostics:
//! - [`ApiError`] - Top-level error type for all operations
//! - [`PathError`] - Dotted-path and URL template errors (caller bugs)
//! - [`ConfigError`] - Endpoint, action and model configuration errors
//! - [`ClientError`] - Transport, HTTP status and duplicate-request errors
//! - [`ValidationError`] - Response conversion errors

mod api_error;
mod client_error;
mod config_error;
mod path_error;
mod validation_error;

pub use api_error::ApiError;
pub use client_error::{ClientError, ErrorResponse};
pub use config_error::ConfigError;
pub use path_error::PathError;
pub use validation_error::ValidationError;
