//! Token lifecycle, token storage and HTTP transport for the Adfin client.
//!
//! # Modules
//!
//! - `auth`: token model, token stores, token endpoint client, token manager
//! - `http`: transport capability and the reqwest-backed default
//! - `utils`: serde helpers for persisted values
//! - `testing`: mocks for tests (`test-utils` feature)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod http;
pub mod utils;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use auth::{
    BootstrapOutcome, ClientCredentials, OAuthClient, TokenManager, TokenManagerError,
    TokenRecord, TokenStore,
};
pub use http::{Transport, TransportError};
pub use utils::serde::iso8601_millis;
