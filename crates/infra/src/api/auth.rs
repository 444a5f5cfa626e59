//! Access token provider seam
//!
//! The dispatcher asks an [`AccessTokenProvider`] for a token before every
//! request. The token manager is the production provider.

use adfin_common::auth::{OAuthClientTrait, TokenManager};
use async_trait::async_trait;

use super::errors::ApiError;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token
    ///
    /// This method should handle token refresh if needed.
    async fn access_token(&self) -> Result<String, ApiError>;
}

#[async_trait]
impl<C: OAuthClientTrait + 'static> AccessTokenProvider for TokenManager<C> {
    async fn access_token(&self) -> Result<String, ApiError> {
        Ok(self.ensure_valid_token().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use adfin_common::auth::{ClientCredentials, OAuthClient, TokenRecord};
    use adfin_common::testing::{MemoryTokenStore, MockTransport};
    use chrono::{TimeDelta, Utc};

    use super::*;

    #[tokio::test]
    async fn token_manager_provides_tokens() {
        let transport = Arc::new(MockTransport::new());
        let record = TokenRecord::new("a", "b", Utc::now() + TimeDelta::hours(1));
        let store = Arc::new(MemoryTokenStore::with_record(record));
        let client =
            OAuthClient::new(transport.clone(), "https://example.com", ClientCredentials::default());
        let provider: Arc<dyn AccessTokenProvider> = Arc::new(TokenManager::new(client, store));

        assert_eq!(provider.access_token().await.unwrap(), "a");
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_tokens_surface_as_auth_error() {
        let transport = Arc::new(MockTransport::new());
        let client =
            OAuthClient::new(transport, "https://example.com", ClientCredentials::default());
        let manager = TokenManager::new(client, Arc::new(MemoryTokenStore::new()));

        let err = manager.access_token().await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
    }
}
