//! Request dispatcher
//!
//! Performs one authenticated HTTP call per request. A valid token is obtained
//! before the request is built, and nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use adfin_common::http::{HttpRequest, HttpResponse, Transport};
use adfin_domain::constants::DEFAULT_BASE_URL;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::auth::AccessTokenProvider;
use super::errors::ApiError;

/// Deadline for a single API call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// API origin (e.g., "https://api.adfin.com"), no trailing slash
    pub origin: String,
    /// Timeout for API requests
    pub timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self { origin: DEFAULT_BASE_URL.to_string(), timeout: REQUEST_TIMEOUT }
    }
}

/// Authenticated API client
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AccessTokenProvider>,
    config: ApiClientConfig,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("config", &self.config).finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a dispatcher that authenticates every request through `auth`
    pub fn new(
        config: ApiClientConfig,
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self { transport, auth, config }
    }

    /// Normalized API origin, without a trailing slash
    pub fn origin(&self) -> &str {
        &self.config.origin
    }

    /// Execute a request and return the parsed JSON body
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `path` - API path starting with `/` (e.g., "/api/customers")
    /// * `body` - Optional JSON body
    /// * `query` - Query parameters, form-encoded onto the URL
    ///
    /// # Returns
    ///
    /// `None` for bodiless responses (empty body, `Content-Length: 0`, a
    /// non-JSON content type, or a literal `null`)
    ///
    /// # Errors
    ///
    /// Returns error if no valid token is available, the call fails or times
    /// out, the status is not 2xx, or a non-empty JSON body does not parse
    #[instrument(skip(self, body, query), fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, &str)],
    ) -> Result<Option<Value>, ApiError> {
        let token = self.auth.access_token().await?;
        let url = self.build_url(path, query);

        let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::InvalidRequest("access token is not a valid header value".into()))?;
        authorization.set_sensitive(true);

        let mut request = HttpRequest::new(method, url)
            .with_header(AUTHORIZATION, authorization)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            request = request.with_body(serde_json::to_vec(body).map_err(ApiError::Serialize)?);
        }

        debug!("sending API request");
        let response = tokio::time::timeout(self.config.timeout, self.transport.send(request))
            .await
            .map_err(|_| {
                warn!(timeout_secs = self.config.timeout.as_secs(), "API request timed out");
                ApiError::Timeout(self.config.timeout)
            })??;

        if !response.is_success() {
            let status = response.status.as_u16();
            warn!(status, "API request rejected");
            return Err(ApiError::Request { status, body: response.text_body() });
        }

        debug!(status = response.status.as_u16(), "API request succeeded");
        parse_body(&response)
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// See [`Self::request`]
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<Value>, ApiError> {
        self.request(Method::GET, path, None, query).await
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// See [`Self::request`]
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<Value>, ApiError> {
        let body = to_json(body)?;
        self.request(Method::POST, path, Some(&body), &[]).await
    }

    /// Execute a PUT request with a JSON body
    ///
    /// # Errors
    ///
    /// See [`Self::request`]
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<Value>, ApiError> {
        let body = to_json(body)?;
        self.request(Method::PUT, path, Some(&body), &[]).await
    }

    /// Execute a request and deserialize a present body into `T`
    ///
    /// # Errors
    ///
    /// See [`Self::request`]; a body that does not match `T` is a parse error
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, ApiError> {
        self.request(method, path, body, query)
            .await?
            .map(|value| serde_json::from_value(value).map_err(ApiError::Parse))
            .transpose()
    }

    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let mut url = format!("{}{}", self.config.origin, path);
        if !query.is_empty() {
            let encoded =
                url::form_urlencoded::Serializer::new(String::new()).extend_pairs(query).finish();
            url.push('?');
            url.push_str(&encoded);
        }
        url
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(ApiError::Serialize)
}

fn parse_body(response: &HttpResponse) -> Result<Option<Value>, ApiError> {
    if response.content_length().map(str::trim) == Some("0") {
        return Ok(None);
    }

    if let Some(content_type) = response.content_type() {
        if !content_type.contains("application/json") {
            debug!(content_type, "non-JSON response, ignoring body");
            return Ok(None);
        }
    }

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    match serde_json::from_slice(&response.body).map_err(ApiError::Parse)? {
        Value::Null => Ok(None),
        value => Ok(Some(value)),
    }
}
