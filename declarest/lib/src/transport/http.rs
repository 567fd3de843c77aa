//! HTTP transport with tracing instrumentation.

use std::collections::BTreeMap;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};
use tracing::{Span, instrument};
use url::Url;

use super::{Transport, TransportResponse};
use crate::error::{ApiError, ClientError, ConfigError, ErrorResponse};
use crate::request::RequestConfig;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for configuring an [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    base_url: Url,
    timeout: Duration,
    default_headers: HeaderMap,
}

impl HttpTransportBuilder {
    fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: HeaderMap::new(),
        }
    }

    /// Sets the default request timeout; actions may override it per request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent with every request.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, ClientError> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| ClientError::Connection(format!("invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| ClientError::Connection(format!("invalid header value: {e}")))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Builds the [`HttpTransport`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpTransport, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(self.default_headers)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(HttpTransport {
            client,
            base_url: self.base_url,
            timeout: self.timeout,
        })
    }
}

/// Sends requests over HTTP with `reqwest`.
///
/// Relative request URLs are resolved against the base URL. Query
/// parameters are appended to the URL and request data is sent as a JSON
/// body.
///
/// ## Examples
///
/// ```rust
/// use declarest::HttpTransport;
/// use std::time::Duration;
///
/// let transport = HttpTransport::builder("https://api.example.com".parse().unwrap())
///     .timeout(Duration::from_secs(5))
///     .default_header("Accept", "application/json")
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(transport.base_url().as_str(), "https://api.example.com/");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    pub fn builder(base_url: Url) -> HttpTransportBuilder {
        HttpTransportBuilder::new(base_url)
    }

    /// Creates a transport with default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: Url) -> Result<Self, ClientError> {
        Self::builder(base_url).build()
    }

    /// Parses `base_url` and creates a transport with default settings.
    pub fn from_base_url(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(ConfigError::from)?;
        Ok(Self::new(base_url)?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a request URL (absolute or relative) and appends the query.
    pub fn full_url(&self, request: &RequestConfig) -> Result<Url, ClientError> {
        let mut url = match Url::parse(&request.url) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base_url
                .join(&request.url)
                .map_err(|e| ClientError::Connection(format!("invalid URL: {e}")))?,
            Err(e) => return Err(ClientError::Connection(format!("invalid URL: {e}"))),
        };

        if let Some(params) = &request.params {
            let pairs = query_pairs(params);
            if !pairs.is_empty() {
                let mut query = url.query_pairs_mut();
                for (key, value) in &pairs {
                    query.append_pair(key, value);
                }
            }
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: RequestConfig) -> BoxFuture<'static, Result<TransportResponse, ClientError>> {
        execute(self.clone(), request).boxed()
    }
}

#[instrument(
    name = "api_request",
    skip(transport, request),
    fields(
        http.method = %request.method,
        http.url = tracing::field::Empty,
        http.status_code = tracing::field::Empty,
        otel.kind = "client",
        otel.status_code = tracing::field::Empty,
    )
)]
async fn execute(
    transport: HttpTransport,
    request: RequestConfig,
) -> Result<TransportResponse, ClientError> {
    let full_url = transport.full_url(&request)?;
    Span::current().record("http.url", full_url.as_str());

    let timeout = request
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or(transport.timeout);

    let mut builder = transport
        .client
        .request(request.method.to_reqwest(), full_url)
        .timeout(timeout);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(data) = &request.data {
        builder = builder.json(data);
    }

    let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    let response = builder
        .send()
        .await
        .map_err(|e| ClientError::from_reqwest(&e, timeout_ms))?;

    let status = response.status();
    let status_code = status.as_u16();
    Span::current().record("http.status_code", status_code);

    let headers = header_map(response.headers());
    let body = response
        .bytes()
        .await
        .map_err(|e| ClientError::from_reqwest(&e, timeout_ms))?;
    let data = decode_body(&body);

    if !status.is_success() {
        let otel_status = if status.is_server_error() {
            "ERROR"
        } else {
            "UNSET"
        };
        Span::current().record("otel.status_code", otel_status);

        return Err(ClientError::HttpStatus(ErrorResponse {
            status: status_code,
            headers,
            data,
            config: request,
        }));
    }

    Span::current().record("otel.status_code", "OK");

    Ok(TransportResponse {
        status: status_code,
        headers,
        data,
    })
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

fn decode_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Flattens query parameters: `null` is skipped, arrays repeat the key and
/// objects are sent as JSON.
fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(item) = query_value(item) {
                        pairs.push((key.clone(), item));
                    }
                }
            }
            other => {
                if let Some(value) = query_value(other) {
                    pairs.push((key.clone(), value));
                }
            }
        }
    }
    pairs
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::RestMethod;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn transport(server: &MockServer) -> HttpTransport {
        HttpTransport::new(Url::parse(&server.uri()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_send_get_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Alice"})))
            .mount(&mock_server)
            .await;

        let response = transport(&mock_server)
            .await
            .send(RequestConfig::new(RestMethod::Get, "/users/1"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.data, json!({"id": 1, "name": "Alice"}));
        assert_eq!(
            response.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_send_query_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/users"))
            .and(query_param("notify", "true"))
            .and(query_param("tag", "a"))
            .and(body_json(json!({"name": "Bob"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 2})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut request = RequestConfig::new(RestMethod::Post, "/users");
        request.params = json!({"notify": true, "tag": ["a"], "skip": null}).as_object().cloned();
        request.data = Some(json!({"name": "Bob"}));

        let response = transport(&mock_server).await.send(request).await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.data, json!({"id": 2}));
    }

    #[tokio::test]
    async fn test_request_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/with-header"))
            .and(header("x-custom-header", "custom-value"))
            .and(header("x-request", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::builder(Url::parse(&mock_server.uri()).unwrap())
            .default_header("X-Custom-Header", "custom-value")
            .unwrap()
            .build()
            .unwrap();
        let mut request = RequestConfig::new(RestMethod::Get, "/with-header");
        request.headers.insert("X-Request".to_string(), "1".to_string());

        transport.send(request).await.unwrap();
    }

    #[tokio::test]
    async fn test_http_error_carries_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/users/9"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "missing"})))
            .mount(&mock_server)
            .await;

        let err = transport(&mock_server)
            .await
            .send(RequestConfig::new(RestMethod::Delete, "/users/9"))
            .await
            .unwrap_err();

        let response = err.response().unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.data, json!({"error": "missing"}));
        assert_eq!(response.config.url, "/users/9");
    }

    #[tokio::test]
    async fn test_text_and_empty_bodies() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/text"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let transport = transport(&mock_server).await;
        let err = transport
            .send(RequestConfig::new(RestMethod::Get, "/text"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.response().unwrap().data, json!("Internal Server Error"));

        let empty = transport
            .send(RequestConfig::new(RestMethod::Delete, "/empty"))
            .await
            .unwrap();
        assert_eq!(empty.data, Value::Null);
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&mock_server)
            .await;

        let mut request = RequestConfig::new(RestMethod::Get, "/slow");
        request.timeout_ms = Some(50);

        let err = transport(&mock_server).await.send(request).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout { duration_ms: 50 }));
    }

    #[test]
    fn test_full_url() {
        let transport = HttpTransport::new(Url::parse("https://example.com/root/").unwrap()).unwrap();

        let mut request = RequestConfig::new(RestMethod::Get, "/users");
        request.params = json!({"q": "a b", "filter": {"x": 1}, "ids": [1, 2]}).as_object().cloned();
        let url = transport.full_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/users?filter=%7B%22x%22%3A1%7D&ids=1&ids=2&q=a+b"
        );

        let relative = RequestConfig::new(RestMethod::Get, "users");
        assert_eq!(
            transport.full_url(&relative).unwrap().as_str(),
            "https://example.com/root/users"
        );

        let absolute = RequestConfig::new(RestMethod::Get, "http://other.test/x");
        assert_eq!(transport.full_url(&absolute).unwrap().as_str(), "http://other.test/x");
    }
}
