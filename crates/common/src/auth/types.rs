//! OAuth 2.0 token types
//!
//! Defines the persisted token record, the token endpoint response and the
//! client credentials used for the authorization_code grant.

use std::fmt;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::serde::iso8601_millis;

/// Seconds subtracted from the server-reported lifetime when computing expiry
pub const EXPIRY_SAFETY_BUFFER_SECS: i64 = 60;

/// Access token, refresh token and expiry, acquired together as one unit
///
/// This is also the persisted form: `expires_at` is written as an ISO-8601
/// string with millisecond precision (`2024-01-01T00:00:00.000Z`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Bearer token for API calls
    pub access_token: String,

    /// Token used to obtain a new access token
    pub refresh_token: String,

    /// Instant after which the access token must not be used
    #[serde(with = "iso8601_millis")]
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        }
    }

    /// Build a record from a token endpoint response issued at `issued_at`.
    ///
    /// Returns `None` when the response carries no refresh token.
    #[must_use]
    pub fn from_grant(response: TokenResponse, issued_at: DateTime<Utc>) -> Option<Self> {
        let expires_at = compute_expiry(issued_at, response.expires_in);
        let refresh_token = response.refresh_token.filter(|t| !t.is_empty())?;
        Some(Self { access_token: response.access_token, refresh_token, expires_at })
    }

    /// True when both tokens are non-empty.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }

    /// True when `now` is at or past the expiry instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

}

impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Absolute expiry for a token issued at `issued_at` with a relative lifetime
/// of `expires_in` seconds, minus the safety buffer.
///
/// The result is truncated to whole milliseconds so it survives a round trip
/// through the persisted ISO-8601 form unchanged. A lifetime shorter than the
/// buffer yields an instant in the past.
#[must_use]
pub fn compute_expiry(issued_at: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    let lifetime = expires_in.saturating_sub(EXPIRY_SAFETY_BUFFER_SECS);
    let expires_at = TimeDelta::try_seconds(lifetime)
        .and_then(|delta| issued_at.checked_add_signed(delta))
        .unwrap_or(if lifetime < 0 { DateTime::<Utc>::MIN_UTC } else { DateTime::<Utc>::MAX_UTC });
    expires_at.trunc_subsecs(3)
}

/// OAuth token response from the token endpoint
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds, relative to issue time
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Keep `previous` as refresh token when the response did not rotate it.
    #[must_use]
    pub fn or_refresh_token(mut self, previous: &str) -> Self {
        if self.refresh_token.as_deref().map_or(true, str::is_empty) {
            self.refresh_token = Some(previous.to_string());
        }
        self
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Credentials for the authorization_code grant
///
/// Fixed for the lifetime of a client. The authorization code is single-use
/// and is only ever sent during bootstrap.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
}

impl ClientCredentials {
    /// True when id, secret and code are all present and non-empty.
    #[must_use]
    pub fn can_exchange_code(&self) -> bool {
        present(&self.client_id) && present(&self.client_secret) && present(&self.code)
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("code", &self.code.as_ref().map(|_| "[REDACTED]"))
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Snapshot of the current token state, safe to log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub has_access_token: bool,
    pub has_refresh_token: bool,
    pub expires_at: Option<DateTime<Utc>>,
    /// `None` when no expiry is known
    pub is_expired: Option<bool>,
}

impl TokenInfo {
    #[must_use]
    pub fn from_record(record: Option<&TokenRecord>, now: DateTime<Utc>) -> Self {
        match record {
            Some(record) => Self {
                has_access_token: !record.access_token.is_empty(),
                has_refresh_token: !record.refresh_token.is_empty(),
                expires_at: Some(record.expires_at),
                is_expired: Some(record.is_expired_at(now)),
            },
            None => Self {
                has_access_token: false,
                has_refresh_token: false,
                expires_at: None,
                is_expired: None,
            },
        }
    }
}
