//! Sending rendered requests.
//!
//! A [`Transport`] turns a [`RequestConfig`] into a [`TransportResponse`].
//! [`HttpTransport`] does so over HTTP with `reqwest`;
//! [`DuplicateRequestsFilter`] wraps any transport and shares in-flight
//! requests between identical callers.

mod dedup;
mod http;

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::ClientError;
use crate::request::RequestConfig;

pub use dedup::{DEFAULT_REJECT_STATUS, DuplicateRequestsFilter, request_key};
pub use http::{HttpTransport, HttpTransportBuilder};

/// A successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Response headers (lower-cased names).
    pub headers: BTreeMap<String, String>,
    /// Decoded body: JSON when it parses, a string otherwise, `null` when empty.
    pub data: Value,
}

/// Sends requests.
///
/// The returned future owns everything it needs so it can be shared between
/// callers and outlive the borrow of the transport.
pub trait Transport: Send + Sync {
    fn send(&self, request: RequestConfig) -> BoxFuture<'static, Result<TransportResponse, ClientError>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: RequestConfig) -> BoxFuture<'static, Result<TransportResponse, ClientError>> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: RequestConfig) -> BoxFuture<'static, Result<TransportResponse, ClientError>> {
        (**self).send(request)
    }
}
