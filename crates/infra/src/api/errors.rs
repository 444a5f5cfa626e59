//! API-specific error types

use std::time::Duration;

use adfin_common::auth::TokenManagerError;
use adfin_common::http::TransportError;
use adfin_domain::{ClassifiedError, ErrorKind};
use thiserror::Error;

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// No valid token could be obtained for the request
    #[error(transparent)]
    Auth(#[from] TokenManagerError),

    /// The API answered with a non-2xx status
    #[error("Adfin API request failed: {status} {body}")]
    Request { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Adfin API request timed out after {0:?}")]
    Timeout(Duration),

    /// A 2xx body that is not valid JSON
    #[error("Failed to parse response: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body of a rejected request
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Request { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Classify the error into an [`ErrorKind`] with its payload.
    ///
    /// Rejected requests are classified from their body; transport failures
    /// and timeouts are connection errors; token failures are authentication
    /// errors. Local errors (parse, serialize, invalid request) have no kind.
    pub fn classify(&self) -> Option<ClassifiedError> {
        match self {
            Self::Request { status, body } => Some(ClassifiedError::from_response(*status, body)),
            Self::Transport(_) | Self::Timeout(_) => Some(ClassifiedError::new(
                ErrorKind::Connection,
                &serde_json::json!({ "message": self.to_string() }),
            )),
            Self::Auth(_) => Some(ClassifiedError::new(
                ErrorKind::Authentication,
                &serde_json::json!({ "message": self.to_string() }),
            )),
            Self::Parse(_) | Self::Serialize(_) | Self::InvalidRequest(_) => None,
        }
    }
}
