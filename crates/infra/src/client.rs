//! Adfin client façade
//!
//! [`Adfin::builder`] collects configuration, a transport and a token store;
//! [`AdfinBuilder::connect`] validates the base URL, runs bootstrap once and
//! returns a ready client. No partially initialized client is ever handed
//! out.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use adfin_common::auth::{
    BootstrapOutcome, CallbackTokenStore, ClientCredentials, FileTokenStore, NoopTokenStore,
    OAuthClient, StoreError, TokenInfo, TokenManager, TokenManagerError, TokenRecord, TokenStore,
};
use adfin_common::http::{ReqwestTransport, Transport, TransportError};
use adfin_domain::{AdfinConfig, ConfigError};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiClientConfig, ApiError};
use crate::resources::{Customers, DirectDebitMandates, Invoices};

/// Errors surfaced by the client façade
#[derive(Debug, Error)]
pub enum AdfinError {
    /// Invalid configuration, raised before any I/O
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] TokenManagerError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type AdfinResult<T> = std::result::Result<T, AdfinError>;

/// Builder for [`Adfin`]
///
/// Token store precedence: `token_file`, then an explicit `token_store`,
/// then `load_token`/`save_token` callbacks, then no persistence.
#[derive(Default)]
pub struct AdfinBuilder {
    config: AdfinConfig,
    transport: Option<Arc<dyn Transport>>,
    token_store: Option<Arc<dyn TokenStore>>,
    callbacks: Option<CallbackTokenStore>,
}

impl std::fmt::Debug for AdfinBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdfinBuilder")
            .field("config", &self.config)
            .field("custom_transport", &self.transport.is_some())
            .field("custom_store", &self.token_store.is_some())
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

impl AdfinBuilder {
    /// Builder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration, e.g. one produced by
    /// [`crate::config::load`].
    pub fn config(mut self, config: AdfinConfig) -> Self {
        self.config = config;
        self
    }

    /// API base URL; must be HTTPS
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// OAuth client identifier
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.client_id = Some(client_id.into());
        self
    }

    /// OAuth client secret
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.config.client_secret = Some(client_secret.into());
        self
    }

    /// One-time authorization code, exchanged when no tokens are stored
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.config.code = Some(code.into());
        self
    }

    /// Redirect URI sent with the code exchange
    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.config.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Persist tokens as JSON in `path`. Wins over every other store.
    pub fn token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.token_file = Some(path.into());
        self
    }

    /// Use this transport instead of the default reqwest one
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Persist tokens through a custom store. Ignored when a token file is set.
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Closure that loads previously saved tokens
    pub fn load_token<F, Fut>(mut self, load: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<TokenRecord>, StoreError>> + Send + 'static,
    {
        self.callbacks = Some(self.callbacks.take().unwrap_or_default().with_load(load));
        self
    }

    /// Closure called with every newly acquired record
    pub fn save_token<F, Fut>(mut self, save: F) -> Self
    where
        F: Fn(TokenRecord) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), StoreError>> + Send + 'static,
    {
        self.callbacks = Some(self.callbacks.take().unwrap_or_default().with_save(save));
        self
    }

    /// Validate the configuration, run bootstrap and return a ready client
    ///
    /// A failed authorization code exchange does not fail the connect: the
    /// client comes back unauthenticated and [`Adfin::bootstrap_outcome`]
    /// says why.
    ///
    /// # Errors
    /// Returns [`AdfinError::Config`] for a missing, unparsable or non-HTTPS
    /// base URL, before any network or storage I/O. Returns
    /// [`AdfinError::Transport`] if the default transport cannot be built.
    pub async fn connect(self) -> AdfinResult<Adfin> {
        let origin = self.config.api_origin()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        let store: Arc<dyn TokenStore> =
            match (&self.config.token_file, self.token_store, self.callbacks) {
                (Some(path), _, _) => Arc::new(FileTokenStore::new(path.clone())),
                (None, Some(store), _) => store,
                (None, None, Some(callbacks)) => Arc::new(callbacks),
                (None, None, None) => Arc::new(NoopTokenStore),
            };

        let credentials = ClientCredentials {
            client_id: self.config.client_id.clone(),
            client_secret: self.config.client_secret.clone(),
            code: self.config.code.clone(),
            redirect_uri: self.config.redirect_uri.clone(),
        };
        let oauth_client = OAuthClient::new(transport.clone(), &origin, credentials);
        let tokens = Arc::new(TokenManager::new(oauth_client, store));

        match tokens.initialize().await {
            Ok(outcome) => info!(origin = %origin, outcome = ?outcome, "Adfin client ready"),
            Err(e) => warn!(origin = %origin, error = %e, "Adfin client bootstrap failed"),
        }

        let api_config = ApiClientConfig { origin, ..ApiClientConfig::default() };
        let api = Arc::new(ApiClient::new(api_config, transport, tokens.clone()));

        Ok(Adfin {
            customers: Customers::new(api.clone()),
            invoices: Invoices::new(api.clone()),
            direct_debit_mandates: DirectDebitMandates::new(api.clone()),
            api,
            tokens,
        })
    }
}

/// Connected Adfin client
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct Adfin {
    api: Arc<ApiClient>,
    tokens: Arc<TokenManager>,
    customers: Customers,
    invoices: Invoices,
    direct_debit_mandates: DirectDebitMandates,
}

impl Adfin {
    /// Start configuring a client
    pub fn builder() -> AdfinBuilder {
        AdfinBuilder::new()
    }

    /// Connect with configuration loaded by [`crate::config::load`].
    ///
    /// # Errors
    /// See [`AdfinBuilder::connect`]; loader errors surface as
    /// [`AdfinError::Config`].
    pub async fn from_env() -> AdfinResult<Self> {
        let config = crate::config::load()?;
        Self::builder().config(config).connect().await
    }

    /// Customer endpoints
    pub fn customers(&self) -> &Customers {
        &self.customers
    }

    /// Invoice endpoints
    pub fn invoices(&self) -> &Invoices {
        &self.invoices
    }

    /// Direct debit mandate endpoints
    pub fn direct_debit_mandates(&self) -> &DirectDebitMandates {
        &self.direct_debit_mandates
    }

    /// Dispatcher for endpoints without a typed facade.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Normalized API origin
    pub fn origin(&self) -> &str {
        self.api.origin()
    }

    /// How bootstrap ended during [`AdfinBuilder::connect`]
    pub fn bootstrap_outcome(&self) -> Option<BootstrapOutcome> {
        self.tokens.bootstrap_outcome()
    }

    /// Force a refresh exchange.
    ///
    /// # Errors
    /// Returns error if no refresh token is held or the exchange fails
    pub async fn refresh_token(&self) -> AdfinResult<()> {
        Ok(self.tokens.refresh().await?)
    }

    /// Adopt and persist tokens obtained outside this client.
    ///
    /// # Errors
    /// Returns error if the record cannot be saved
    pub async fn store_tokens(&self, record: TokenRecord) -> AdfinResult<()> {
        Ok(self.tokens.store_tokens(record).await?)
    }

    /// True when an access token is held
    pub async fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated().await
    }

    /// Redacted summary of the current tokens
    pub async fn token_info(&self) -> TokenInfo {
        self.tokens.token_info().await
    }
}
