//! Request descriptors and the builder that renders an action call into one.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::action::Action;
use crate::error::PathError;
use crate::method::RestMethod;
use crate::model::Model;
use crate::template::{combine_params, find_url_params, parse_url};

/// A fully rendered HTTP request, ready for a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestConfig {
    pub method: RestMethod,
    /// Rendered URL; relative URLs are resolved by the transport.
    pub url: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// JSON request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Query string parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "is_false")]
    pub ignore_duplicate_request: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub reject_duplicate_request: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_duplicate_status_code: Option<u16>,
}

fn is_false(b: &bool) -> bool {
    !b
}

impl RequestConfig {
    pub fn new(method: RestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            data: None,
            params: None,
            timeout_ms: None,
            ignore_duplicate_request: false,
            reject_duplicate_request: false,
            reject_duplicate_status_code: None,
        }
    }
}

/// Request payload of an action call.
#[derive(Debug)]
pub enum Payload {
    /// Plain JSON data.
    Json(Value),
    /// A model instance, serialized through [`Model::to_json`].
    Model(Box<dyn Model>),
}

impl Payload {
    pub fn model(model: impl Model + 'static) -> Self {
        Self::Model(Box::new(model))
    }

    /// The payload as seen by `@path` parameter lookups.
    pub fn view(&self) -> Cow<'_, Value> {
        match self {
            Self::Json(value) => Cow::Borrowed(value),
            Self::Model(model) => Cow::Owned(Value::Object(model.fields().clone())),
        }
    }

    /// The request body; only objects, arrays and models produce one.
    pub fn to_body(&self) -> Option<Value> {
        match self {
            Self::Model(model) => Some(model.to_json()),
            Self::Json(value @ (Value::Object(_) | Value::Array(_))) => Some(value.clone()),
            Self::Json(_) => None,
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Lets a body-carrying action be called with parameters only: the
/// parameters then become the payload.
pub fn normalize_arguments(
    action: &Action,
    params: Option<Map<String, Value>>,
    data: Option<Payload>,
) -> (Option<Map<String, Value>>, Option<Payload>) {
    match (params, data) {
        (Some(params), None) if action.has_body() => (None, Some(Payload::Json(Value::Object(params)))),
        other => other,
    }
}

/// Renders an action call into a [`RequestConfig`].
///
/// Declared parameters are resolved against the payload, caller parameters
/// are laid over them, and the result is split between URL placeholders and
/// the query string.
///
/// ## Errors
///
/// Returns a [`PathError`] if a declared `@path` is invalid or the URL
/// template uses the reserved placeholder name.
pub fn build_request_config(
    action: &Action,
    params: Option<&Map<String, Value>>,
    data: Option<&Payload>,
) -> Result<RequestConfig, PathError> {
    let mut request = action.request_template();

    if action.has_body() {
        request.data = data.and_then(Payload::to_body);
    }

    let view = data.map(Payload::view);
    let params = combine_params(action.params(), params, view.as_deref())?;
    let url_params = find_url_params(action.url())?;

    request.url = parse_url(
        action.url(),
        &params,
        &url_params,
        action.strip_trailing_slashes(),
    );

    let query: Map<String, Value> = params
        .into_iter()
        .filter(|(key, _)| !url_params.contains(key))
        .collect();
    if !query.is_empty() {
        request.params = Some(query);
    }

    Ok(request)
}
