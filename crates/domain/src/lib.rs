//! # Adfin Domain
//!
//! Domain types shared by the Adfin client crates.
//!
//! This crate contains:
//! - Client configuration ([`AdfinConfig`]) and its validation
//! - Configuration error types
//! - Classification of API error payloads into [`ErrorKind`]s
//! - Invoice activation payloads
//!
//! ## Architecture
//! - No dependencies on other Adfin crates
//! - No I/O

pub mod classification;
pub mod config;
pub mod constants;
pub mod errors;
pub mod invoice;

// Re-export commonly used items
pub use classification::{classify, ClassifiedError, ErrorKind, ErrorPayload};
pub use config::AdfinConfig;
pub use errors::{ConfigError, ConfigResult};
pub use invoice::{CollectionMethod, InvoiceActivation};
