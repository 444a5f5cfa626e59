//! Configuration management

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{DEFAULT_BASE_URL, REQUIRED_SCHEME};
use crate::errors::{ConfigError, ConfigResult};

/// Client configuration
///
/// Every credential is optional: a client restored purely from a token store
/// needs none of them. Secrets are never serialized back out.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdfinConfig {
    #[serde(default = "default_base_url", alias = "url")]
    pub base_url: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub client_secret: Option<String>,
    /// Single-use authorization code, exchanged once during bootstrap.
    #[serde(default, skip_serializing)]
    pub code: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Optional path of a file-backed token store.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for AdfinConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_id: None,
            client_secret: None,
            code: None,
            redirect_uri: None,
            token_file: None,
        }
    }
}

impl fmt::Debug for AdfinConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdfinConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("code", &self.code.as_ref().map(|_| "<redacted>"))
            .field("redirect_uri", &self.redirect_uri)
            .field("token_file", &self.token_file)
            .finish()
    }
}

impl AdfinConfig {
    /// Origin (`scheme://host[:port]`) of the configured base URL.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL does not parse and
    /// [`ConfigError::InsecureBaseUrl`] if its scheme is not `https`.
    pub fn api_origin(&self) -> ConfigResult<String> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if url.scheme() != REQUIRED_SCHEME {
            return Err(ConfigError::InsecureBaseUrl(self.base_url.clone()));
        }

        Ok(url.origin().ascii_serialization())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_production() {
        let config = AdfinConfig::default();
        assert_eq!(config.api_origin().unwrap(), "https://api.adfin.com");
    }

    #[test]
    fn origin_drops_path_and_query() {
        let config = AdfinConfig {
            base_url: "https://example.com/some/path?x=1".to_string(),
            ..AdfinConfig::default()
        };
        assert_eq!(config.api_origin().unwrap(), "https://example.com");
    }

    #[test]
    fn origin_keeps_explicit_port() {
        let config =
            AdfinConfig { base_url: "https://example.com:8443".to_string(), ..Default::default() };
        assert_eq!(config.api_origin().unwrap(), "https://example.com:8443");
    }

    #[test]
    fn http_is_rejected() {
        let config =
            AdfinConfig { base_url: "http://example.com".to_string(), ..Default::default() };
        assert!(matches!(config.api_origin(), Err(ConfigError::InsecureBaseUrl(_))));
    }

    #[test]
    fn garbage_url_is_rejected() {
        let config = AdfinConfig { base_url: "not a url".to_string(), ..Default::default() };
        assert!(matches!(config.api_origin(), Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn secrets_are_not_serialized() {
        let config = AdfinConfig {
            client_id: Some("c".into()),
            client_secret: Some("s".into()),
            code: Some("x".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"client_id\":\"c\""));
        assert!(!json.contains("client_secret"));
        assert!(!json.contains("\"code\""));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AdfinConfig {
            client_secret: Some("hunter2".into()),
            code: Some("one-time".into()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("one-time"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn url_alias_is_accepted() {
        let config: AdfinConfig = serde_json::from_str(r#"{"url":"https://example.com"}"#).unwrap();
        assert_eq!(config.base_url, "https://example.com");
    }
}
