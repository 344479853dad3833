//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, `ConfigError` and failed `ApiResult` envelopes into
//! user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use chromaplay_config::ConfigError;
use chromaplay_core::{ApiResult, CoreError, FailureKind};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to Chroma at {url}")]
    #[diagnostic(
        code(chromaplay::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             URL: {url}\n\
             Try: chromaplay call heartbeat --url {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(chromaplay::auth_failed),
        help(
            "Verify the bearer token for this server.\n\
             Run: chromaplay config set-token --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(chromaplay::not_found),
        help("Run: chromaplay {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("{method} failed: {message}")]
    #[diagnostic(code(chromaplay::api_error))]
    ApiError { method: String, message: String },

    #[error("{method} failed: {message}")]
    #[diagnostic(
        code(chromaplay::missing),
        help("Run: chromaplay collections list to see existing collections")
    )]
    Missing { method: String, message: String },

    #[error("{0}")]
    #[diagnostic(
        code(chromaplay::no_collection),
        help("Pass --collection <name>, or create one with: chromaplay call createCollection")
    )]
    NoCollection(String),

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(chromaplay::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(chromaplay::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: chromaplay config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(chromaplay::config))]
    Config(Box<figment::Error>),

    #[error("Could not access the system keyring: {0}")]
    #[diagnostic(
        code(chromaplay::keyring),
        help("Set auth_token_env on the profile to read the token from an environment variable instead.")
    )]
    Keyring(String),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(chromaplay::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(chromaplay::json), help("Check the JSON text and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Failed to write config: {0}")]
    #[diagnostic(code(chromaplay::config_write))]
    ConfigWrite(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::Missing { .. } | Self::ProfileNotFound { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::Json(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Classify a failed connection probe against `url`.
    pub fn from_connect<T>(result: &ApiResult<T>, url: &str, profile: &str) -> Self {
        let message = result.error.clone().unwrap_or_default();
        match result.status {
            Some(401 | 403) => Self::AuthFailed {
                profile: profile.to_owned(),
                message,
            },
            Some(_) => Self::ApiError {
                method: "heartbeat".into(),
                message,
            },
            None => Self::ConnectionFailed {
                url: url.to_owned(),
                source: message.into(),
            },
        }
    }

    /// Classify a failed method call.
    pub fn from_call<T>(result: &ApiResult<T>, method: &str, profile: &str) -> Self {
        let message = result.error.clone().unwrap_or_default();
        match result.status {
            Some(401 | 403) => Self::AuthFailed {
                profile: profile.to_owned(),
                message,
            },
            Some(404) => Self::Missing {
                method: method.to_owned(),
                message,
            },
            _ if result.failure == Some(FailureKind::NoCollection) => Self::NoCollection(message),
            _ => Self::ApiError {
                method: method.to_owned(),
                message,
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::Api { message, status } if matches!(status, Some(401 | 403)) => {
                CliError::AuthFailed {
                    profile: "current".into(),
                    message,
                }
            }
            CoreError::Api { message, .. } => CliError::ApiError {
                method: "request".into(),
                message,
            },
            err @ CoreError::NoCollectionSelected => CliError::NoCollection(err.to_string()),
            CoreError::UnknownMethod(id) => CliError::NotFound {
                resource_type: "method".into(),
                identifier: id,
                list_command: "methods list".into(),
            },
            CoreError::InvalidParameters { method, message } => CliError::Validation {
                field: format!("{method} parameters"),
                reason: message,
            },
            CoreError::Internal(message) => CliError::ApiError {
                method: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile(name) => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Keyring(e) => CliError::Keyring(e.to_string()),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::ConfigWrite(e.to_string()),
        }
    }
}
