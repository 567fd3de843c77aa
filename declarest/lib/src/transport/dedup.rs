//! In-flight request de-duplication.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{self, BoxFuture, Shared};
use serde_json::Value;
use tracing::debug;
use xxhash_rust::xxh64::xxh64;

use super::{Transport, TransportResponse};
use crate::error::{ClientError, ErrorResponse};
use crate::request::RequestConfig;

/// Status of a rejected duplicate when the request does not name one.
pub const DEFAULT_REJECT_STATUS: u16 = 400;

type SharedResponse = Shared<BoxFuture<'static, Result<TransportResponse, ClientError>>>;
type PendingMap = HashMap<u64, SharedResponse>;

/// Fingerprint of a request: method, URL, query and body.
///
/// Headers and flags are not part of the key.
pub fn request_key(request: &RequestConfig) -> u64 {
    let mut buf = String::with_capacity(request.url.len() + 32);
    buf.push_str(&request.method.to_string());
    buf.push('\n');
    buf.push_str(&request.url);
    buf.push('\n');
    if let Some(params) = &request.params {
        buf.push_str(&Value::Object(params.clone()).to_string());
    }
    buf.push('\n');
    if let Some(data) = &request.data {
        buf.push_str(&data.to_string());
    }
    xxh64(buf.as_bytes(), 0)
}

/// Shares one in-flight request between identical callers.
///
/// While a request is pending, an identical request (same
/// [`request_key`]) does not reach the wrapped transport: it either joins
/// the pending result or, with `reject_duplicate_request`, fails straight
/// away with [`ClientError::DuplicateRequest`]. Requests flagged
/// `ignore_duplicate_request` always go through. An entry is dropped as soon
/// as its request settles, successfully or not.
///
/// ## Examples
///
/// ```rust
/// use declarest::{DuplicateRequestsFilter, HttpTransport};
///
/// let http = HttpTransport::new("https://api.example.com".parse().unwrap()).unwrap();
/// let filter = DuplicateRequestsFilter::new(http);
/// assert_eq!(filter.pending_count(), 0);
/// ```
pub struct DuplicateRequestsFilter<T> {
    inner: Arc<T>,
    pending: Arc<Mutex<PendingMap>>,
}

impl<T> Clone for DuplicateRequestsFilter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T> std::fmt::Debug for DuplicateRequestsFilter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateRequestsFilter")
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl<T> DuplicateRequestsFilter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner: Arc::new(inner),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Number of requests currently in flight.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

impl<T: Transport + 'static> Transport for DuplicateRequestsFilter<T> {
    fn send(&self, request: RequestConfig) -> BoxFuture<'static, Result<TransportResponse, ClientError>> {
        if request.ignore_duplicate_request {
            return self.inner.send(request);
        }

        let key = request_key(&request);
        let mut pending = lock(&self.pending);

        if let Some(in_flight) = pending.get(&key) {
            if request.reject_duplicate_request {
                let status = request
                    .reject_duplicate_status_code
                    .unwrap_or(DEFAULT_REJECT_STATUS);
                debug!(method = %request.method, url = %request.url, status, "Rejecting duplicate request");
                let rejected = ClientError::DuplicateRequest(ErrorResponse {
                    status,
                    headers: Default::default(),
                    data: Value::Null,
                    config: request,
                });
                return future::ready(Err(rejected)).boxed();
            }
            debug!(method = %request.method, url = %request.url, "Joining in-flight request");
            return in_flight.clone().boxed();
        }

        let registry = Arc::clone(&self.pending);
        let send = self.inner.send(request);
        let shared = async move {
            let result = send.await;
            lock(&registry).remove(&key);
            result
        }
        .boxed()
        .shared();

        pending.insert(key, shared.clone());
        shared.boxed()
    }
}

fn lock(pending: &Mutex<PendingMap>) -> MutexGuard<'_, PendingMap> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}
