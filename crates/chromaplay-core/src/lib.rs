//! Session state and reactive data layer between `chromaplay-api` and
//! front ends (the CLI and its interactive shell).
//!
//! - **[`registry`]**: static catalog of every invocable method
//!   ([`ApiMethod`]), with parameter schema and example payload.
//!
//! - **[`ApiClient`]**: session facade owning the connection config and
//!   the current collection. Every operation returns a timed
//!   [`ApiResult`]; [`ApiClient::execute_method`] dispatches by id through
//!   the closed [`Command`] enum.
//!
//! - **[`AppStore`]**: single observable [`AppState`] snapshot, kept in
//!   sync with the client's connectivity. Listeners are notified
//!   synchronously in subscription order; async consumers use
//!   [`AppStore::watch`].

pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod observe;
pub mod registry;
pub mod result;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::ApiClient;
pub use command::Command;
pub use command::requests::*;
pub use config::{
    ClientOptions, ConnectionConfig, ConnectionUpdate, DEFAULT_DATABASE, DEFAULT_TENANT,
    DEFAULT_URL,
};
pub use error::{CoreError, FailureKind};
pub use observe::{Listeners, Subscription};
pub use registry::{ApiMethod, ApiParameter, MethodCategory, MethodId, ParamType};
pub use result::ApiResult;
pub use store::{AppState, AppStore};

// Wire types consumers see in `ApiResult` payloads.
pub use chromaplay_api::{Collection, GetResponse, Heartbeat, Include, Metadata, QueryResponse};
