//! Declarative REST endpoint definitions.
//!
//! The `declarest` crate describes a REST API as a set of named endpoints,
//! each with named actions, and turns action calls into HTTP requests.
//!
//! ## Features
//!
//! - **URL templates**: `:name` placeholders filled from caller parameters or
//!   from the request payload (`@path` lookups); leftovers become the query
//! - **Shared defaults**: stock `query`/`get`/`create`/`update`/`delete`
//!   actions, overridable per endpoint and per action
//! - **Response checks**: shape validation and conversion to registered models
//! - **Request de-duplication**: identical in-flight requests share one call
//! - **Declarative configuration**: whole APIs from YAML or JSON files
//!
//! ## Example
//!
//! ```rust
//! use declarest::{Api, EndpointConfig, Payload, RestMethod};
//! use serde_json::json;
//!
//! let api = Api::builder()
//!     .base_url("/api")
//!     .register_endpoint("users", EndpointConfig::default())
//!     .build()
//!     .unwrap();
//!
//! let users = api.endpoint("users").unwrap();
//! let request = users
//!     .request_config("update", None, Some(Payload::Json(json!({"id": 7, "name": "Ann"}))))
//!     .unwrap();
//!
//! assert_eq!(request.method, RestMethod::Put);
//! assert_eq!(request.url, "/api/users/7");
//! assert_eq!(request.data, Some(json!({"id": 7, "name": "Ann"})));
//! ```

pub mod action;
pub mod api;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod method;
pub mod model;
pub mod name;
pub mod request;
pub mod response;
pub mod template;
pub mod transport;

// Re-exports for convenience
pub use action::{Action, ActionConfig, ActionContext, ErrorInterceptor, SuccessInterceptor};
pub use api::{Api, ApiBuilder};
pub use config::{ApiConfig, ApiDefaults, default_actions};
pub use endpoint::{Endpoint, EndpointConfig};
pub use error::{ApiError, ClientError, ConfigError, ErrorResponse, PathError, ValidationError};
pub use method::RestMethod;
pub use model::{BaseModel, Model, ModelRegistry};
pub use name::{Name, NameError};
pub use request::{Payload, RequestConfig, build_request_config, normalize_arguments};
pub use response::ApiResponse;
pub use transport::{
    DuplicateRequestsFilter, HttpTransport, HttpTransportBuilder, Transport, TransportResponse,
};
