//! Transport trait and the request/response values it carries

use std::future::Future;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Errors raised by a transport while sending a request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Outbound HTTP request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Create a request with no headers and no body.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: HeaderMap::new(), body: None }
    }

    /// Set a header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Header value as text, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body decoded as UTF-8 (lossy).
    #[must_use]
    pub fn body_text(&self) -> Option<String> {
        self.body.as_deref().map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

/// HTTP response as seen by the client
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Response with the given status, no headers and an empty body.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), body: Vec::new() }
    }

    /// JSON response with a matching `Content-Type`.
    #[must_use]
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        let mut response = Self::new(status).with_body(value.to_string());
        response.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }

    /// Plain-text response.
    #[must_use]
    pub fn text(status: StatusCode, body: &str) -> Self {
        let mut response = Self::new(status).with_body(body);
        response.headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        response
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// True for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body decoded as UTF-8 (lossy).
    #[must_use]
    pub fn text_body(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// `Content-Type` header, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// `Content-Length` header, if present.
    #[must_use]
    pub fn content_length(&self) -> Option<&str> {
        self.headers.get(CONTENT_LENGTH).and_then(|v| v.to_str().ok())
    }
}

/// Sends one HTTP request and returns the complete response
///
/// Implementations must not retry and must not impose their own deadline;
/// both are decided by the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and buffer the full response.
    ///
    /// # Errors
    /// Returns [`TransportError`] when no response could be obtained. Non-2xx
    /// statuses are *not* errors at this layer.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Adapts an async function into a [`Transport`]
///
/// ```
/// use adfin_common::http::{FnTransport, HttpResponse};
/// use reqwest::StatusCode;
///
/// let transport = FnTransport::new(|_request: adfin_common::http::HttpRequest| async {
///     Ok::<_, adfin_common::http::TransportError>(HttpResponse::json(StatusCode::OK, &serde_json::json!({ "id": "cus_123" })))
/// });
/// # let _ = transport;
/// ```
pub struct FnTransport<F> {
    send: F,
}

impl<F> FnTransport<F> {
    /// Wrap `send`.
    pub fn new(send: F) -> Self {
        Self { send }
    }
}

#[async_trait]
impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(HttpRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HttpResponse, TransportError>> + Send,
{
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (self.send)(request).await
    }
}
