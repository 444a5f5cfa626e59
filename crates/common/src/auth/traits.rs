//! Traits for token endpoint and token persistence operations
//!
//! These traits enable dependency injection and testing by abstracting
//! external dependencies (the OAuth server, durable token storage).

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::store::StoreError;
use super::types::{TokenRecord, TokenResponse};

/// Trait for token endpoint operations
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Exchange the configured authorization code for tokens
    ///
    /// # Errors
    /// Returns error if credentials are incomplete, the request fails, or the
    /// response cannot be parsed
    async fn exchange_authorization_code(&self) -> Result<TokenResponse, OAuthClientError>;

    /// Obtain a new access token using `refresh_token`
    ///
    /// # Errors
    /// Returns error if refresh fails or the token is invalid/revoked
    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError>;

    /// Whether the authorization_code grant can be attempted at all
    fn can_exchange_code(&self) -> bool;
}

/// Durable storage for a single token record
///
/// `load` returning an error is not fatal to callers; the token manager
/// treats it as "nothing stored". `save` errors are surfaced.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the stored record, `Ok(None)` if nothing is stored
    ///
    /// # Errors
    /// Returns error if the backend fails or the stored content is malformed
    async fn load(&self) -> Result<Option<TokenRecord>, StoreError>;

    /// Persist `record`, replacing whatever was stored before
    ///
    /// # Errors
    /// Returns error if the record could not be written
    async fn save(&self, record: &TokenRecord) -> Result<(), StoreError>;
}
