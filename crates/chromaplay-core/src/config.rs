// ── Runtime connection configuration ──
//
// These types describe *where* and *as whom* to talk to a Chroma server.
// They never touch disk; chromaplay-config builds them from profiles.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

pub const DEFAULT_URL: &str = "http://localhost:8000";
pub const DEFAULT_TENANT: &str = "default_tenant";
pub const DEFAULT_DATABASE: &str = "default_database";

/// Transport-level settings fixed for the lifetime of an `ApiClient`.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub url: Url,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout: None,
        }
    }
}

impl ClientOptions {
    pub fn new(url: Url) -> Self {
        Self { url, timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

fn default_url() -> Url {
    // Constant input; a parse failure here would be a typo in DEFAULT_URL.
    Url::parse(DEFAULT_URL).unwrap_or_else(|_| unreachable!("DEFAULT_URL is a valid URL"))
}

/// Tenant, database and optional bearer token for the current session.
///
/// Empty tenant/database strings are stored as given but resolve to the
/// server defaults when a request path is built.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub tenant: String,
    pub database: String,
    pub auth_token: Option<SecretString>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            tenant: DEFAULT_TENANT.into(),
            database: DEFAULT_DATABASE.into(),
            auth_token: None,
        }
    }
}

impl ConnectionConfig {
    /// Tenant used for request paths.
    pub fn tenant(&self) -> &str {
        non_empty_or(&self.tenant, DEFAULT_TENANT)
    }

    /// Database used for request paths.
    pub fn database(&self) -> &str {
        non_empty_or(&self.database, DEFAULT_DATABASE)
    }

    /// Fold a partial update into this config. Omitted fields keep their
    /// previous values; an empty token clears the stored one.
    pub fn merge(&mut self, update: ConnectionUpdate) {
        if let Some(tenant) = update.tenant {
            self.tenant = tenant;
        }
        if let Some(database) = update.database {
            self.database = database;
        }
        if let Some(token) = update.auth_token {
            self.auth_token = if token.expose_secret().is_empty() {
                None
            } else {
                Some(token)
            };
        }
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

/// Partial connection settings passed to `ApiClient::connect`.
#[derive(Debug, Clone, Default)]
pub struct ConnectionUpdate {
    pub tenant: Option<String>,
    pub database: Option<String>,
    pub auth_token: Option<SecretString>,
}

impl ConnectionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn auth_token(mut self, token: SecretString) -> Self {
        self.auth_token = Some(token);
        self
    }
}
