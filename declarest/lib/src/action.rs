//! Actions: one named operation (method, URL suffix, parameters, response
//! expectations) within an endpoint.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ApiError, ClientError, ConfigError};
use crate::method::RestMethod;
use crate::model::{ModelFactory, ModelRegistry, is_falsy};
use crate::request::RequestConfig;
use crate::response::ApiResponse;
use crate::template::{ParamSet, concat_url};
use crate::transport::TransportResponse;

type SuccessFn = dyn Fn(TransportResponse) -> Result<Value, ApiError> + Send + Sync;
type ErrorFn = dyn Fn(ClientError) -> Result<Value, ApiError> + Send + Sync;

/// Replaces the default success handling of an action.
///
/// Receives the transport response and returns the raw data handed on to
/// model conversion.
#[derive(Clone)]
pub struct SuccessInterceptor(Arc<SuccessFn>);

impl SuccessInterceptor {
    pub fn new(
        f: impl Fn(TransportResponse) -> Result<Value, ApiError> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for SuccessInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SuccessInterceptor(..)")
    }
}

/// Replaces the default error handling of an action.
///
/// Returning `Ok` recovers from the failure with the given raw data.
#[derive(Clone)]
pub struct ErrorInterceptor(Arc<ErrorFn>);

impl ErrorInterceptor {
    pub fn new(
        f: impl Fn(ClientError) -> Result<Value, ApiError> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for ErrorInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorInterceptor(..)")
    }
}

/// Declarative description of an action.
///
/// Unset fields fall back to the owning endpoint's settings when the
/// [`Action`] is built.
///
/// ## Examples
///
/// ```rust
/// use declarest::{ActionConfig, RestMethod};
///
/// let archive = ActionConfig::new(RestMethod::Post)
///     .url("archive")
///     .returns_model()
///     .header("X-Reason", "cleanup");
///
/// assert_eq!(archive.method, Some(RestMethod::Post));
/// assert!(archive.is_model);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActionConfig {
    /// HTTP method; `GET` when unset.
    pub method: Option<RestMethod>,
    /// URL suffix appended to the endpoint URL.
    pub url: Option<String>,
    /// Parameter templates; the endpoint's when unset.
    pub params: Option<ParamSet>,
    /// Model name; the endpoint's when unset.
    pub model: Option<String>,
    /// The response is expected to be an array.
    pub is_array: bool,
    /// The response is converted to model instances.
    pub is_model: bool,
    /// Strip trailing slashes from the final URL; the endpoint's when unset.
    pub strip_trailing_slashes: Option<bool>,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
    /// Per-request timeout.
    pub timeout_ms: Option<u64>,
    /// Bypass the duplicate request filter.
    pub ignore_duplicate_request: bool,
    /// Reject, rather than join, an identical in-flight request.
    pub reject_duplicate_request: bool,
    /// Status of the synthesized duplicate rejection (400 when unset).
    pub reject_duplicate_status_code: Option<u16>,
    #[serde(skip)]
    pub success: Option<SuccessInterceptor>,
    #[serde(skip)]
    pub error: Option<ErrorInterceptor>,
}

impl ActionConfig {
    pub fn new(method: RestMethod) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn params(mut self, params: ParamSet) -> Self {
        self.params = Some(params);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Marks the response as an array.
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    /// Marks the response for model conversion.
    pub fn returns_model(mut self) -> Self {
        self.is_model = true;
        self
    }

    pub fn strip_trailing_slashes(mut self, strip: bool) -> Self {
        self.strip_trailing_slashes = Some(strip);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Sends every call, even when an identical request is in flight.
    pub fn ignore_duplicates(mut self) -> Self {
        self.ignore_duplicate_request = true;
        self
    }

    /// Fails a call with `status` when an identical request is in flight.
    pub fn reject_duplicates(mut self, status: u16) -> Self {
        self.reject_duplicate_request = true;
        self.reject_duplicate_status_code = Some(status);
        self
    }

    pub fn on_success(
        mut self,
        f: impl Fn(TransportResponse) -> Result<Value, ApiError> + Send + Sync + 'static,
    ) -> Self {
        self.success = Some(SuccessInterceptor::new(f));
        self
    }

    pub fn on_error(
        mut self,
        f: impl Fn(ClientError) -> Result<Value, ApiError> + Send + Sync + 'static,
    ) -> Self {
        self.error = Some(ErrorInterceptor::new(f));
        self
    }
}

/// Endpoint-level settings an action inherits.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    /// Full endpoint URL template.
    pub url: &'a str,
    pub model: Option<&'a str>,
    pub params: &'a ParamSet,
    pub enforce_data_format: bool,
    pub strip_trailing_slashes: bool,
}

#[derive(Clone)]
struct BoundModel {
    name: String,
    factory: ModelFactory,
}

impl fmt::Debug for BoundModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoundModel").field(&self.name).finish()
    }
}

/// A resolved action, immutable after construction and reused for every call.
#[derive(Debug, Clone)]
pub struct Action {
    name: String,
    method: RestMethod,
    url: String,
    params: ParamSet,
    model: Option<BoundModel>,
    is_array: bool,
    is_model: bool,
    strip_trailing_slashes: bool,
    enforce_data_format: bool,
    headers: BTreeMap<String, String>,
    timeout_ms: Option<u64>,
    ignore_duplicate_request: bool,
    reject_duplicate_request: bool,
    reject_duplicate_status_code: Option<u16>,
    success: Option<SuccessInterceptor>,
    error: Option<ErrorInterceptor>,
}

impl Action {
    /// Resolves an action definition against its endpoint.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::UnknownModel`] if the action (or inherited
    /// endpoint) model is not registered.
    pub fn new(
        name: impl Into<String>,
        config: ActionConfig,
        context: ActionContext<'_>,
        registry: &ModelRegistry,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let model_name = config
            .model
            .filter(|model| !model.is_empty())
            .or_else(|| context.model.map(str::to_string));
        let model = match model_name {
            Some(name) => Some(BoundModel {
                factory: registry.factory(&name)?,
                name,
            }),
            None => None,
        };

        let action = Self {
            method: config.method.unwrap_or_default(),
            url: concat_url(context.url, config.url.as_deref().unwrap_or("")),
            params: config.params.unwrap_or_else(|| context.params.clone()),
            model,
            is_array: config.is_array,
            is_model: config.is_model,
            strip_trailing_slashes: config
                .strip_trailing_slashes
                .unwrap_or(context.strip_trailing_slashes),
            enforce_data_format: context.enforce_data_format,
            headers: config.headers,
            timeout_ms: config.timeout_ms,
            ignore_duplicate_request: config.ignore_duplicate_request,
            reject_duplicate_request: config.reject_duplicate_request,
            reject_duplicate_status_code: config.reject_duplicate_status_code,
            success: config.success,
            error: config.error,
            name,
        };
        debug!(action = %action.name, method = %action.method, url = %action.url, "Action set up");
        Ok(action)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> RestMethod {
        self.method
    }

    /// Full URL template (endpoint URL plus action suffix).
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.name.as_str())
    }

    pub fn has_body(&self) -> bool {
        self.method.has_body()
    }

    pub fn expects_array(&self) -> bool {
        self.is_array
    }

    /// `true` when a model is bound and model conversion was requested.
    pub fn expects_model(&self) -> bool {
        self.model.is_some() && self.is_model
    }

    pub fn strip_trailing_slashes(&self) -> bool {
        self.strip_trailing_slashes
    }

    pub fn enforce_data_format(&self) -> bool {
        self.enforce_data_format
    }

    /// The descriptor fields copied verbatim from the action; URL, body and
    /// query are filled in per call.
    pub(crate) fn request_template(&self) -> RequestConfig {
        RequestConfig {
            headers: self.headers.clone(),
            timeout_ms: self.timeout_ms,
            ignore_duplicate_request: self.ignore_duplicate_request,
            reject_duplicate_request: self.reject_duplicate_request,
            reject_duplicate_status_code: self.reject_duplicate_status_code,
            ..RequestConfig::new(self.method, self.url.clone())
        }
    }

    /// Runs the success interceptor over a transport response.
    pub fn intercept_success(&self, response: TransportResponse) -> Result<Value, ApiError> {
        match &self.success {
            Some(interceptor) => (interceptor.0)(response),
            None => Ok(self.check_shape(response.data)),
        }
    }

    /// Runs the error interceptor over a transport failure.
    pub fn intercept_error(&self, error: ClientError) -> Result<Value, ApiError> {
        match &self.error {
            Some(interceptor) => (interceptor.0)(error),
            None => Err(error.into()),
        }
    }

    /// Default shape validation of response data.
    ///
    /// A mismatch between the expected and received shape is logged and,
    /// when data format enforcement is on, replaced with an empty value of
    /// the expected shape. Falsy data becomes an empty value too.
    pub fn check_shape(&self, data: Value) -> Value {
        let expects_array = self.expects_array();
        let mut data = data;

        if data.is_array() != expects_array {
            warn!(
                action = %self.name,
                expected = if expects_array { "array" } else { "object" },
                got = type_name(&data),
                "Unexpected response shape"
            );
            if self.enforce_data_format {
                data = empty_value(expects_array);
            }
        }

        if is_falsy(&data) {
            empty_value(expects_array)
        } else {
            data
        }
    }

    /// Converts raw data into the bound model; arrays map element-wise.
    ///
    /// Without a bound model the data is returned as-is.
    pub fn convert_to_model(&self, data: Value) -> ApiResponse {
        let Some(model) = &self.model else {
            return ApiResponse::Raw(data);
        };
        match data {
            Value::Array(items) => {
                ApiResponse::Models(items.into_iter().map(|item| (model.factory)(item)).collect())
            }
            other => ApiResponse::Model((model.factory)(other)),
        }
    }

    /// Final conversion step of a successful call.
    pub fn finish(&self, raw: Value) -> ApiResponse {
        if self.expects_model() {
            self.convert_to_model(raw)
        } else {
            ApiResponse::Raw(raw)
        }
    }
}

fn empty_value(array: bool) -> Value {
    if array {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
