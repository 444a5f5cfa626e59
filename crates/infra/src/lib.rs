//! # Adfin Client
//!
//! Authenticated access to the Adfin API.
//!
//! This crate contains:
//! - The request dispatcher ([`ApiClient`])
//! - Typed resource facades (customers, invoices, direct debit mandates)
//! - Configuration loading from environment variables and files
//! - The [`Adfin`] client and its builder
//!
//! ## Architecture
//! - Token lifecycle and transport come from `adfin-common`
//! - Configuration types and error classification come from `adfin-domain`
//!
//! ```no_run
//! use adfin_infra::Adfin;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let adfin = Adfin::builder()
//!     .client_id("client_id")
//!     .client_secret("client_secret")
//!     .code("authorization_code")
//!     .token_file("adfin-tokens.json")
//!     .connect()
//!     .await?;
//!
//! let customer = adfin.customers().create(&json!({ "name": "Alice" })).await?;
//! println!("{customer:?}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod resources;

// Re-export commonly used items
pub use api::{AccessTokenProvider, ApiClient, ApiClientConfig, ApiError};
pub use client::{Adfin, AdfinBuilder, AdfinError, AdfinResult};
pub use resources::{Customers, DirectDebitMandates, Invoices};
