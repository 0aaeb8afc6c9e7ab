//! Transport and API error types

use serde_json::Value;
use thiserror::Error;

/// Failures at the wire level
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// No response was received at all. The only transient failure shape.
    #[error("no response from remote: {0}")]
    NoResponse(String),

    /// The request could not be constructed
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result alias for gateway operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Failures of a remote API call, after status classification
#[derive(Debug, Error)]
pub enum ApiError {
    /// Wire-level failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Remote returned 403
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// Request path that was denied
        path: String,
    },

    /// Definitive non-2xx response, body surfaced verbatim and never retried
    #[error("remote rejected request ({status}): {body}")]
    RemoteRejected {
        /// HTTP status code
        status: u16,
        /// Response body as received
        body: Value,
    },

    /// Response violated the mandated shape. Fatal, never retried.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result alias for API operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// True only for the no-response shape eligible for the retry policy
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(TransportError::NoResponse(_)))
    }

    /// Status code of a definitive rejection, if that is what this is
    pub fn rejection_status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Body of a definitive rejection, if that is what this is
    pub fn rejection_body(&self) -> Option<&Value> {
        match self {
            Self::RemoteRejected { body, .. } => Some(body),
            _ => None,
        }
    }
}
