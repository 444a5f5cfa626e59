//! OAuth 2.0 token lifecycle
//!
//! Keeps a client holding a valid bearer token: tokens are restored from a
//! [`TokenStore`] or acquired with the authorization_code grant once, then
//! refreshed lazily whenever a caller finds them expired.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenManager   │  Bootstrap, expiry checks, single-flight refresh
//! └────────┬────────┘
//!          │
//!          ├──► OAuthClient   (token endpoint over a Transport)
//!          │
//!          └──► TokenStore    (Noop / File / Callback persistence)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use adfin_common::auth::{ClientCredentials, FileTokenStore, OAuthClient, TokenManager};
//! use adfin_common::http::ReqwestTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = Arc::new(ReqwestTransport::new()?);
//!     let credentials = ClientCredentials {
//!         client_id: Some("client_id".to_string()),
//!         client_secret: Some("client_secret".to_string()),
//!         code: Some("authorization_code".to_string()),
//!         redirect_uri: None,
//!     };
//!
//!     let client = OAuthClient::new(transport, "https://api.adfin.com", credentials);
//!     let manager = TokenManager::new(client, Arc::new(FileTokenStore::new("tokens.json")));
//!
//!     let outcome = manager.initialize().await?;
//!     println!("bootstrap: {outcome:?}");
//!
//!     let _access_token = manager.ensure_valid_token().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod store;
pub mod token_manager;
pub mod traits;
pub mod types;

pub use client::{OAuthClient, OAuthClientError, TOKEN_PATH, TOKEN_REQUEST_TIMEOUT};
pub use store::{CallbackTokenStore, FileTokenStore, NoopTokenStore, StoreError};
pub use token_manager::{BootstrapOutcome, TokenManager, TokenManagerError};
pub use traits::{OAuthClientTrait, TokenStore};
pub use types::{
    compute_expiry, ClientCredentials, TokenInfo, TokenRecord, TokenResponse,
    EXPIRY_SAFETY_BUFFER_SECS,
};
