//! Classification of API error payloads
//!
//! The API reports failures as a JSON object whose `type` (and, for newer
//! endpoints, `code`) identifies the failure family. [`classify`] maps such a
//! payload onto an [`ErrorKind`] and keeps the raw payload alongside typed
//! accessors for the fields callers usually want.
//!
//! Resolution order:
//! 1. `type == "temporary_session_expired"`
//! 2. `code == "invalid_fields"` (missing required fields)
//! 3. the legacy `type` table, falling back to [`ErrorKind::Unknown`]

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure family reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Card,
    InvalidRequest,
    Api,
    Authentication,
    Permission,
    RateLimit,
    Connection,
    SignatureVerification,
    Idempotency,
    InvalidGrant,
    TemporarySessionExpired,
    Unknown,
}

impl ErrorKind {
    /// Stable name of the error class, e.g. `"AdfinCardError"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Card => "AdfinCardError",
            Self::InvalidRequest => "AdfinInvalidRequestError",
            Self::Api => "AdfinAPIError",
            Self::Authentication => "AdfinAuthenticationError",
            Self::Permission => "AdfinPermissionError",
            Self::RateLimit => "AdfinRateLimitError",
            Self::Connection => "AdfinConnectionError",
            Self::SignatureVerification => "AdfinSignatureVerificationError",
            Self::Idempotency => "AdfinIdempotencyError",
            Self::InvalidGrant => "AdfinInvalidGrantError",
            Self::TemporarySessionExpired => "TemporarySessionExpiredError",
            Self::Unknown => "AdfinUnknownError",
        }
    }

    /// Map a legacy `type` string to a kind.
    fn from_legacy_type(raw_type: Option<&str>) -> Self {
        match raw_type {
            Some("card_error") => Self::Card,
            Some("invalid_request_error") => Self::InvalidRequest,
            Some("api_error") => Self::Api,
            Some("authentication_error") => Self::Authentication,
            Some("rate_limit_error") => Self::RateLimit,
            Some("idempotency_error") => Self::Idempotency,
            Some("invalid_grant") => Self::InvalidGrant,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error payload as returned by the API.
///
/// Only the fields the client reads are typed; everything is still available
/// through [`ErrorPayload::raw`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub raw: Value,
    pub raw_type: Option<String>,
    pub code: Option<String>,
    pub message: String,
    pub doc_url: Option<String>,
    pub param: Option<String>,
    pub detail: Option<String>,
    pub request_id: Option<String>,
    pub status_code: Option<u16>,
    pub user_message: Option<String>,
    pub decline_code: Option<String>,
}

impl ErrorPayload {
    /// Extract the typed fields from a raw payload.
    ///
    /// Non-object payloads produce an empty payload that still keeps `raw`.
    #[must_use]
    pub fn from_raw(raw: &Value) -> Self {
        let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_owned);

        Self {
            raw: raw.clone(),
            raw_type: text("type"),
            code: text("code"),
            message: text("message").unwrap_or_default(),
            doc_url: text("doc_url"),
            param: text("param"),
            detail: text("detail"),
            request_id: text("requestId"),
            status_code: raw
                .get("statusCode")
                .and_then(Value::as_u64)
                .and_then(|code| u16::try_from(code).ok()),
            user_message: text("user_message"),
            decline_code: text("decline_code"),
        }
    }
}

/// An API failure with its kind resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub payload: ErrorPayload,
}

impl ClassifiedError {
    /// Build an error of an explicit kind (bypasses classification).
    #[must_use]
    pub fn new(kind: ErrorKind, raw: &Value) -> Self {
        Self { kind, payload: ErrorPayload::from_raw(raw) }
    }

    /// Classify a raw HTTP error response.
    ///
    /// JSON object bodies go through [`classify`]; the HTTP status fills in
    /// `status_code` when the payload does not carry one. Anything else is
    /// reported as [`ErrorKind::Unknown`] with the body text as message.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(raw @ Value::Object(_)) => {
                let mut classified = classify(&raw);
                if classified.payload.status_code.is_none() {
                    classified.payload.status_code = Some(status);
                }
                classified
            }
            _ => Self {
                kind: ErrorKind::Unknown,
                payload: ErrorPayload {
                    raw: Value::String(body.to_owned()),
                    message: body.to_owned(),
                    status_code: Some(status),
                    ..ErrorPayload::default()
                },
            },
        }
    }

    /// Human readable message from the payload.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.payload.message
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.payload.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.payload.message)
        }
    }
}

impl std::error::Error for ClassifiedError {}

/// Classify a raw error payload.
#[must_use]
pub fn classify(raw: &Value) -> ClassifiedError {
    let raw_type = raw.get("type").and_then(Value::as_str);
    let code = raw.get("code").and_then(Value::as_str);

    let kind = if raw_type == Some("temporary_session_expired") {
        ErrorKind::TemporarySessionExpired
    } else if code == Some("invalid_fields") {
        ErrorKind::InvalidRequest
    } else {
        ErrorKind::from_legacy_type(raw_type)
    };

    ClassifiedError::new(kind, raw)
}
