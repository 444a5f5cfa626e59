//! Token manager
//!
//! Manages the OAuth token lifecycle for one client:
//! - Bootstrap, run at most once: restore from the token store, else exchange
//!   the authorization code
//! - Lazy expiry check before every use
//! - Single-flight refresh through the refresh_token grant
//! - Persistence of every newly acquired record

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use super::client::{OAuthClient, OAuthClientError};
use super::store::StoreError;
use super::traits::{OAuthClientTrait, TokenStore};
use super::types::{TokenInfo, TokenRecord};

/// Error type for token manager operations
#[derive(Debug)]
pub enum TokenManagerError {
    /// The authorization_code exchange during bootstrap failed
    AcquisitionFailed(OAuthClientError),

    /// The refresh_token exchange failed; the previous record is kept
    RefreshFailed(OAuthClientError),

    /// A refresh is required but the current record has no refresh token
    NoRefreshToken,

    /// No tokens at all
    NotAuthenticated,

    /// A newly acquired record could not be persisted
    Storage(StoreError),
}

impl std::fmt::Display for TokenManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AcquisitionFailed(e) => write!(f, "Failed to get initial OAuth2 token: {e}"),
            Self::RefreshFailed(e) => write!(f, "Failed to refresh OAuth2 token: {e}"),
            Self::NoRefreshToken => write!(f, "No refresh token available"),
            Self::NotAuthenticated => write!(f, "Not authenticated (no tokens)"),
            Self::Storage(e) => write!(f, "Failed to save OAuth2 token: {e}"),
        }
    }
}

impl std::error::Error for TokenManagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AcquisitionFailed(e) | Self::RefreshFailed(e) => Some(e),
            Self::Storage(e) => Some(e),
            Self::NoRefreshToken | Self::NotAuthenticated => None,
        }
    }
}

impl From<StoreError> for TokenManagerError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err)
    }
}

/// How bootstrap ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A complete record was loaded from the token store
    Restored,
    /// The authorization code was exchanged for a new record
    Acquired,
    /// The authorization code exchange failed; no tokens are held
    AcquisitionFailed(String),
    /// Nothing stored and no credentials to exchange
    Unauthenticated,
}

type BootstrapTask = Shared<BoxFuture<'static, BootstrapOutcome>>;

/// Token manager with lazy refresh
///
/// Holds the single in-memory token record of a client. Only bootstrap and
/// refresh write it; readers take a snapshot.
pub struct TokenManager<C: OAuthClientTrait + 'static = OAuthClient> {
    state: Arc<TokenState<C>>,
    bootstrap: OnceLock<BootstrapTask>,
    refresh_gate: Mutex<()>,
}

/// State shared between the manager and its bootstrap task
struct TokenState<C> {
    oauth_client: Arc<C>,
    store: Arc<dyn TokenStore>,
    current_tokens: RwLock<Option<TokenRecord>>,
    /// Error raised by bootstrap, handed to the first caller that sees it finish
    bootstrap_failure: parking_lot::Mutex<Option<TokenManagerError>>,
}

impl<C: OAuthClientTrait + 'static> std::fmt::Debug for TokenManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("bootstrap", &self.bootstrap_outcome())
            .finish_non_exhaustive()
    }
}

impl<C: OAuthClientTrait + 'static> TokenManager<C> {
    /// Create a token manager. Nothing is loaded until [`Self::initialize`]
    /// or the first [`Self::ensure_valid_token`].
    #[must_use]
    pub fn new(oauth_client: C, store: Arc<dyn TokenStore>) -> Self {
        Self::with_shared_client(Arc::new(oauth_client), store)
    }

    /// Create a token manager around an OAuth client that is already shared
    #[must_use]
    pub fn with_shared_client(oauth_client: Arc<C>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            state: Arc::new(TokenState {
                oauth_client,
                store,
                current_tokens: RwLock::new(None),
                bootstrap_failure: parking_lot::Mutex::new(None),
            }),
            bootstrap: OnceLock::new(),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Run bootstrap if it has not run yet and return its outcome
    ///
    /// Bootstrap runs once, on its own task: concurrent callers wait for the
    /// same task, and a caller that gives up waiting does not cancel it.
    ///
    /// # Errors
    /// Only the first caller to see bootstrap finish receives the acquisition
    /// or storage error. Everyone else gets the recorded outcome.
    pub async fn initialize(&self) -> Result<BootstrapOutcome, TokenManagerError> {
        let outcome = self.bootstrap_task().await;

        match self.state.bootstrap_failure.lock().take() {
            Some(err) => Err(err),
            None => Ok(outcome),
        }
    }

    /// Outcome of bootstrap, `None` while it has not completed
    #[must_use]
    pub fn bootstrap_outcome(&self) -> Option<BootstrapOutcome> {
        self.bootstrap.get().and_then(|task| task.peek().cloned())
    }

    /// Spawns the bootstrap task on first use.
    fn bootstrap_task(&self) -> BootstrapTask {
        self.bootstrap
            .get_or_init(|| {
                let state = Arc::clone(&self.state);
                let handle = tokio::spawn(async move { state.run_bootstrap().await });
                async move {
                    handle.await.unwrap_or_else(|e| {
                        error!(error = %e, "bootstrap task did not complete");
                        BootstrapOutcome::AcquisitionFailed(e.to_string())
                    })
                }
                .boxed()
                .shared()
            })
            .clone()
    }

    /// Return an access token that is not expired
    ///
    /// Waits for bootstrap, then refreshes if the token is missing or at or
    /// past its expiry. Concurrent callers that find the token expired share
    /// one refresh.
    ///
    /// # Errors
    /// Returns error if a refresh is needed and impossible or fails, or if the
    /// refreshed record cannot be saved
    #[instrument(skip(self))]
    pub async fn ensure_valid_token(&self) -> Result<String, TokenManagerError> {
        self.initialize().await?;

        if let Some(token) = self.state.valid_access_token().await {
            return Ok(token);
        }

        let _gate = self.refresh_gate.lock().await;
        if let Some(token) = self.state.valid_access_token().await {
            debug!("token refreshed by a concurrent caller");
            return Ok(token);
        }

        self.refresh_locked().await
    }

    /// Refresh now, regardless of expiry
    ///
    /// # Errors
    /// Returns error if there is no refresh token, the exchange fails, or the
    /// new record cannot be saved
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), TokenManagerError> {
        self.wait_for_bootstrap().await;
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked().await.map(|_| ())
    }

    /// Adopt and persist a record obtained elsewhere
    ///
    /// # Errors
    /// Returns error if the record cannot be saved; it is held in memory
    /// either way
    pub async fn store_tokens(&self, record: TokenRecord) -> Result<(), TokenManagerError> {
        self.wait_for_bootstrap().await;
        let _gate = self.refresh_gate.lock().await;
        self.state.adopt(record).await
    }

    /// Snapshot of the current record
    pub async fn tokens(&self) -> Option<TokenRecord> {
        self.state.current_tokens.read().await.clone()
    }

    /// True when an access token is held (it may be expired)
    pub async fn is_authenticated(&self) -> bool {
        self.state
            .current_tokens
            .read()
            .await
            .as_ref()
            .is_some_and(|t| !t.access_token.is_empty())
    }

    /// Redacted summary of the current record
    pub async fn token_info(&self) -> TokenInfo {
        TokenInfo::from_record(self.state.current_tokens.read().await.as_ref(), Utc::now())
    }

    async fn wait_for_bootstrap(&self) {
        if let Err(e) = self.initialize().await {
            debug!(error = %e, "continuing after bootstrap failure");
        }
    }

    /// Caller must hold `refresh_gate`.
    async fn refresh_locked(&self) -> Result<String, TokenManagerError> {
        let refresh_token = {
            let tokens = self.state.current_tokens.read().await;
            match tokens.as_ref() {
                Some(t) if t.refresh_token.is_empty() => return Err(TokenManagerError::NoRefreshToken),
                Some(t) => t.refresh_token.clone(),
                None => return Err(TokenManagerError::NotAuthenticated),
            }
        };

        let response = self
            .state
            .oauth_client
            .refresh_access_token(&refresh_token)
            .await
            .map_err(|e| {
                warn!(error = %e, "token refresh failed");
                TokenManagerError::RefreshFailed(e)
            })?;

        let record = TokenRecord::from_grant(response.or_refresh_token(&refresh_token), Utc::now())
            .ok_or_else(|| {
                TokenManagerError::RefreshFailed(OAuthClientError::ParseError(
                    "token response has no refresh_token".to_string(),
                ))
            })?;

        let access_token = record.access_token.clone();
        self.state.adopt(record).await?;
        info!("access token refreshed");

        Ok(access_token)
    }
}

impl<C: OAuthClientTrait> TokenState<C> {
    async fn run_bootstrap(&self) -> BootstrapOutcome {
        match self.store.load().await {
            Ok(Some(record)) if record.is_well_formed() => {
                info!(expires_at = %record.expires_at, "restored tokens from store");
                *self.current_tokens.write().await = Some(record);
                return BootstrapOutcome::Restored;
            }
            Ok(Some(_)) => warn!("stored token record is incomplete, ignoring it"),
            Ok(None) => debug!("no stored tokens"),
            Err(e) => warn!(error = %e, "failed to load stored tokens, ignoring"),
        }

        if !self.oauth_client.can_exchange_code() {
            info!("no stored tokens and no authorization code, starting unauthenticated");
            return BootstrapOutcome::Unauthenticated;
        }

        let (outcome, failure) = match self.acquire_initial().await {
            Ok(()) => return BootstrapOutcome::Acquired,
            // The record is held in memory even though it was not persisted
            Err(err @ TokenManagerError::Storage(_)) => {
                error!(error = %err, "initial token acquired but not saved");
                (BootstrapOutcome::Acquired, err)
            }
            Err(err) => {
                error!(error = %err, "initial token acquisition failed");
                (BootstrapOutcome::AcquisitionFailed(err.to_string()), err)
            }
        };

        *self.bootstrap_failure.lock() = Some(failure);
        outcome
    }

    async fn acquire_initial(&self) -> Result<(), TokenManagerError> {
        let response = self
            .oauth_client
            .exchange_authorization_code()
            .await
            .map_err(TokenManagerError::AcquisitionFailed)?;

        let record = TokenRecord::from_grant(response, Utc::now()).ok_or_else(|| {
            TokenManagerError::AcquisitionFailed(OAuthClientError::ParseError(
                "token response has no refresh_token".to_string(),
            ))
        })?;

        self.adopt(record).await
    }

    async fn valid_access_token(&self) -> Option<String> {
        let now = Utc::now();
        let tokens = self.current_tokens.read().await;
        tokens
            .as_ref()
            .filter(|t| !t.access_token.is_empty() && !t.is_expired_at(now))
            .map(|t| t.access_token.clone())
    }

    /// Replace the in-memory record, then persist it.
    async fn adopt(&self, record: TokenRecord) -> Result<(), TokenManagerError> {
        *self.current_tokens.write().await = Some(record.clone());
        debug!(expires_at = %record.expires_at, "tokens updated");

        self.store.save(&record).await.map_err(|e| {
            error!(error = %e, "failed to save tokens");
            TokenManagerError::Storage(e)
        })
    }
}
