//! Domain-level constants shared by every Adfin crate.

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.adfin.com";

/// Only scheme accepted for the API base URL.
pub const REQUIRED_SCHEME: &str = "https";

// Environment variable names read by the configuration loader
pub const ENV_BASE_URL: &str = "ADFIN_BASE_URL";
pub const ENV_CLIENT_ID: &str = "ADFIN_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "ADFIN_CLIENT_SECRET";
pub const ENV_CODE: &str = "ADFIN_CODE";
pub const ENV_REDIRECT_URI: &str = "ADFIN_REDIRECT_URI";
pub const ENV_TOKEN_FILE: &str = "ADFIN_TOKEN_FILE";
