//! Adfin API client
//!
//! This module provides the authenticated request dispatcher used by every
//! resource facade.
//!
//! # Architecture
//!
//! - Token obtained from an [`AccessTokenProvider`] before each request
//! - Transport injected as `Arc<dyn Transport>`
//! - 10 second deadline per request, no retries
//! - Non-2xx responses surface as [`ApiError::Request`] with the raw body

pub mod auth;
pub mod client;
pub mod errors;

pub use auth::AccessTokenProvider;
pub use client::{ApiClient, ApiClientConfig, REQUEST_TIMEOUT};
pub use errors::ApiError;
