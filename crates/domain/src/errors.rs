//! Error types used throughout the client

use thiserror::Error;

/// Configuration errors.
///
/// These are raised before any network or storage I/O happens, so a caller
/// that receives one can be sure no request was attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Adfin API base URL must use HTTPS (got {0})")]
    InsecureBaseUrl(String),

    #[error("Invalid Adfin API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Missing configuration value: {0}")]
    Missing(String),

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("Failed to read configuration file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse configuration file {path}: {reason}")]
    Parse { path: String, reason: String },
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
