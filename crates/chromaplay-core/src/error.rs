// ── Core error types ──
//
// Errors surfaced by chromaplay-core. The client folds every one of these
// into `ApiResult.error` via `Display`, so the messages are operator-facing.
// The `From<chromaplay_api::Error>` impl translates transport-layer errors.

use thiserror::Error;

use crate::registry::MethodId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    /// Transport or server failure. `message` is the server-provided text
    /// (or the transport's own description) with no extra prefix.
    #[error("{message}")]
    Api {
        message: String,
        /// HTTP status code (if the server answered).
        status: Option<u16>,
    },

    // ── Precondition errors ──────────────────────────────────────────
    #[error("No collection selected. Please select or create a collection first.")]
    NoCollectionSelected,

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Invalid parameters for {method}: {message}")]
    InvalidParameters { method: MethodId, message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Which kind of failure produced a failed `ApiResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connection,
    Api,
    NoCollection,
    UnknownMethod,
    InvalidParameters,
    Internal,
}

impl CoreError {
    /// HTTP status code, when the failure came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ConnectionFailed { .. } => FailureKind::Connection,
            Self::Api { .. } => FailureKind::Api,
            Self::NoCollectionSelected => FailureKind::NoCollection,
            Self::UnknownMethod(_) => FailureKind::UnknownMethod,
            Self::InvalidParameters { .. } => FailureKind::InvalidParameters,
            Self::Internal(_) => FailureKind::Internal,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<chromaplay_api::Error> for CoreError {
    fn from(err: chromaplay_api::Error) -> Self {
        match err {
            chromaplay_api::Error::Transport(ref e) if e.is_connect() => {
                CoreError::ConnectionFailed {
                    url: e
                        .url()
                        .map_or_else(|| "<unknown>".into(), |u| u.origin().ascii_serialization()),
                    reason: err.to_string(),
                }
            }
            chromaplay_api::Error::Transport(e) => CoreError::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            chromaplay_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            chromaplay_api::Error::InvalidUrl(e) => CoreError::Internal(format!("Invalid URL: {e}")),
            chromaplay_api::Error::InvalidBaseUrl(url) => {
                CoreError::Internal(format!("Invalid base URL: {url}"))
            }
            e @ chromaplay_api::Error::Deserialization { .. } => CoreError::Api {
                message: e.to_string(),
                status: None,
            },
        }
    }
}
