//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If none are set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ADFIN_BASE_URL`: API base URL (defaults to `https://api.adfin.com`)
//! - `ADFIN_CLIENT_ID`: OAuth2 client id
//! - `ADFIN_CLIENT_SECRET`: OAuth2 client secret
//! - `ADFIN_CODE`: Authorization code for the initial exchange
//! - `ADFIN_REDIRECT_URI`: Redirect URI registered with the code
//! - `ADFIN_TOKEN_FILE`: Path of the file-backed token store
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./adfin.toml`, `./adfin.json`, `./config.toml`, `./config.json`
//! 2. The same names next to the executable

use std::path::{Path, PathBuf};

use adfin_domain::constants::{
    ENV_BASE_URL, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_CODE, ENV_REDIRECT_URI, ENV_TOKEN_FILE,
};
use adfin_domain::{AdfinConfig, ConfigError, ConfigResult};

const CONFIG_FILE_NAMES: [&str; 4] = ["adfin.toml", "adfin.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If none of them are
/// set, falls back to loading from a config file.
///
/// # Errors
/// Returns [`ConfigError`] if neither source yields a configuration or the
/// file cannot be read or parsed.
pub fn load() -> ConfigResult<AdfinConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from the process environment
///
/// # Errors
/// Returns [`ConfigError::Missing`] if no `ADFIN_*` variable is set.
pub fn load_from_env() -> ConfigResult<AdfinConfig> {
    load_from_env_with(|key| std::env::var(key).ok())
}

/// Load configuration through an arbitrary variable lookup
///
/// Empty values count as unset.
///
/// # Errors
/// Returns [`ConfigError::Missing`] if the lookup yields none of the
/// `ADFIN_*` variables.
pub fn load_from_env_with<F>(lookup: F) -> ConfigResult<AdfinConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let base_url = var(ENV_BASE_URL);
    let client_id = var(ENV_CLIENT_ID);
    let client_secret = var(ENV_CLIENT_SECRET);
    let code = var(ENV_CODE);
    let redirect_uri = var(ENV_REDIRECT_URI);
    let token_file = var(ENV_TOKEN_FILE).map(PathBuf::from);

    let any_set = base_url.is_some()
        || client_id.is_some()
        || client_secret.is_some()
        || code.is_some()
        || redirect_uri.is_some()
        || token_file.is_some();
    if !any_set {
        return Err(ConfigError::Missing("no ADFIN_* environment variables set".to_string()));
    }

    let defaults = AdfinConfig::default();
    Ok(AdfinConfig {
        base_url: base_url.unwrap_or(defaults.base_url),
        client_id,
        client_secret,
        code,
        redirect_uri,
        token_file,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns [`ConfigError`] if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> ConfigResult<AdfinConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::Io {
                    path: p.display().to_string(),
                    reason: "file not found".to_string(),
                });
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConfigError::Missing("no config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
        path: config_path.display().to_string(),
        reason: e.to_string(),
    })?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, by file extension
fn parse_config(contents: &str, path: &Path) -> ConfigResult<AdfinConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let parse_error =
        |reason: String| ConfigError::Parse { path: path.display().to_string(), reason };

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| parse_error(e.to_string())),
        "json" => serde_json::from_str(contents).map_err(|e| parse_error(e.to_string())),
        other => Err(parse_error(format!("unsupported config format: {other}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    probe_dirs(&dirs)
}

fn probe_dirs(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}
