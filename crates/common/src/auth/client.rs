//! OAuth 2.0 token endpoint client
//!
//! Implements the two grants the API supports against
//! `{origin}/api/oauth2/token`:
//! - authorization_code (bootstrap, code sent once)
//! - refresh_token

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use tracing::{debug, instrument, warn};

use super::traits::OAuthClientTrait;
use super::types::{ClientCredentials, TokenResponse};
use crate::http::{HttpRequest, Transport, TransportError};

/// Path of the token endpoint under the API origin
pub const TOKEN_PATH: &str = "/api/oauth2/token";

/// Deadline for a single token endpoint call
pub const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for OAuth client operations
#[derive(Debug)]
pub enum OAuthClientError {
    /// Request could not be sent or no response was received
    Transport(TransportError),

    /// No response within the deadline; the request was abandoned
    Timeout(Duration),

    /// Token endpoint answered with a non-2xx status
    Status { status: u16, body: String },

    /// Failed to parse response
    ParseError(String),

    /// Credentials required for the grant are missing
    NotConfigured(String),
}

impl std::fmt::Display for OAuthClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "{e}"),
            Self::Timeout(d) => write!(f, "Token request timed out after {}s", d.as_secs()),
            Self::Status { status, body } => {
                write!(f, "OAuth2 token request failed: {status} {body}")
            }
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::NotConfigured(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for OAuthClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for OAuthClientError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

/// Token endpoint client
#[derive(Clone)]
pub struct OAuthClient {
    transport: Arc<dyn Transport>,
    token_url: String,
    credentials: ClientCredentials,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("token_url", &self.token_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    /// Create a client for the token endpoint under `origin`
    /// (`scheme://host[:port]`, no trailing slash).
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        origin: &str,
        credentials: ClientCredentials,
    ) -> Self {
        Self {
            transport,
            token_url: format!("{origin}{TOKEN_PATH}"),
            credentials,
        }
    }

    async fn request_token(
        &self,
        params: &[(&str, &str)],
    ) -> Result<TokenResponse, OAuthClientError> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();

        let request = HttpRequest::new(Method::POST, self.token_url.clone())
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded"))
            .with_header(ACCEPT, HeaderValue::from_static("application/json"))
            .with_body(body);

        let response = tokio::time::timeout(TOKEN_REQUEST_TIMEOUT, self.transport.send(request))
            .await
            .map_err(|_| {
                warn!(timeout_secs = TOKEN_REQUEST_TIMEOUT.as_secs(), "token request timed out");
                OAuthClientError::Timeout(TOKEN_REQUEST_TIMEOUT)
            })??;

        if !response.is_success() {
            let status = response.status.as_u16();
            warn!(status, "token endpoint rejected request");
            return Err(OAuthClientError::Status { status, body: response.text_body() });
        }

        serde_json::from_slice(&response.body).map_err(|e| OAuthClientError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl OAuthClientTrait for OAuthClient {
    #[instrument(skip(self), fields(token_url = %self.token_url))]
    async fn exchange_authorization_code(&self) -> Result<TokenResponse, OAuthClientError> {
        let missing = |name: &str| OAuthClientError::NotConfigured(format!("{name} is not set"));
        let creds = &self.credentials;
        let client_id = creds.client_id.as_deref().ok_or_else(|| missing("client_id"))?;
        let client_secret = creds.client_secret.as_deref().ok_or_else(|| missing("client_secret"))?;
        let code = creds.code.as_deref().ok_or_else(|| missing("code"))?;

        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
        ];
        if let Some(redirect_uri) = creds.redirect_uri.as_deref() {
            params.push(("redirect_uri", redirect_uri));
        }

        debug!("exchanging authorization code");
        self.request_token(&params).await
    }

    #[instrument(skip(self, refresh_token), fields(token_url = %self.token_url))]
    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        let mut params = vec![("grant_type", "refresh_token")];
        if let Some(client_id) = self.credentials.client_id.as_deref() {
            params.push(("client_id", client_id));
        }
        if let Some(client_secret) = self.credentials.client_secret.as_deref() {
            params.push(("client_secret", client_secret));
        }
        params.push(("refresh_token", refresh_token));

        debug!("refreshing access token");
        self.request_token(&params).await
    }

    fn can_exchange_code(&self) -> bool {
        self.credentials.can_exchange_code()
    }
}
