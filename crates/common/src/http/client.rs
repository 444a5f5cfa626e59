use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use tracing::debug;

use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// Network transport backed by a shared `reqwest::Client`.
///
/// Sends each request exactly once. Deadlines are applied by the caller, the
/// builder only bounds connection setup.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    /// Wrap an already configured client.
    pub fn from_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest { method, url, headers, body } = request;
        debug!(%method, %url, "sending HTTP request");

        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            TransportError::from(err)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        debug!(%method, %url, %status, "received HTTP response");

        let body =
            response.bytes().await.map_err(|err| TransportError::Body(err.to_string()))?.to_vec();

        Ok(HttpResponse { status, headers, body })
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    connect_timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
    no_proxy: bool,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            user_agent: Some(concat!("adfin-rust/", env!("CARGO_PKG_VERSION")).to_string()),
            default_headers: None,
            no_proxy: false,
        }
    }
}

impl ReqwestTransportBuilder {
    /// TCP connect deadline
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// `User-Agent` sent with every request
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Headers added to every request
    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Ignore system proxy settings.
    pub fn no_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    /// Build the transport.
    ///
    /// # Errors
    /// Returns an error if the underlying client cannot be constructed.
    pub fn build(self) -> Result<ReqwestTransport, TransportError> {
        let mut builder = ReqwestClient::builder().connect_timeout(self.connect_timeout);

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        if self.no_proxy {
            builder = builder.no_proxy();
        }

        let client = builder.build().map_err(|err| TransportError::InvalidRequest(err.to_string()))?;

        Ok(ReqwestTransport { client })
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::Body(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
    use reqwest::{Method, StatusCode};
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn transport() -> ReqwestTransport {
        ReqwestTransport::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn sends_method_headers_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/customers"))
            .and(header("authorization", "Bearer abc"))
            .and(body_string(r#"{"name":"Alice"}"#))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("content-type", "application/json")
                    .set_body_string(r#"{"id":"cus_123"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = HttpRequest::new(Method::POST, format!("{}/api/customers", server.uri()))
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer abc"))
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(r#"{"name":"Alice"}"#);

        let response = transport().send(request).await.unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.text_body(), r#"{"id":"cus_123"}"#);
    }

    #[tokio::test]
    async fn non_success_status_is_not_a_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let request = HttpRequest::new(Method::GET, format!("{}/missing", server.uri()));
        let response = transport().send(request).await.unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.text_body(), "not found");
    }

    #[tokio::test]
    async fn sends_exactly_once_on_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let request = HttpRequest::new(Method::GET, format!("{}/flaky", server.uri()));
        let response = transport().send(request).await.unwrap();

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let request = HttpRequest::new(Method::GET, "http://127.0.0.1:1/unreachable");
        let result = transport().send(request).await;

        assert!(matches!(result, Err(TransportError::Network(_))));
    }

    #[tokio::test]
    async fn malformed_url_is_invalid_request() {
        let request = HttpRequest::new(Method::GET, "not a url");
        let result = transport().send(request).await;

        assert!(matches!(result, Err(TransportError::InvalidRequest(_))));
    }
}
