// ── Application store ──
//
// Single observable snapshot of everything a front end renders. Every
// mutation replaces the snapshot wholesale, then notifies synchronous
// listeners in subscription order and publishes to a `watch` channel
// for async consumers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::observe::{Listeners, Subscription};
use crate::registry::{self, ApiMethod};
use crate::result::ApiResult;

// ── AppState ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub is_connected: bool,
    pub current_method: Option<&'static ApiMethod>,
    /// Always `None` while disconnected.
    pub current_collection_name: Option<String>,
    pub collections: Vec<String>,
    /// Raw, possibly invalid, JSON text being edited.
    pub parameter_json: String,
    pub last_result: Option<ApiResult<Value>>,
    pub is_executing: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            is_connected: false,
            current_method: Some(registry::first()),
            current_collection_name: None,
            collections: Vec::new(),
            parameter_json: "{}".into(),
            last_result: None,
            is_executing: false,
        }
    }
}

// ── AppStore ─────────────────────────────────────────────────────────

/// Observable state container wired to an [`ApiClient`].
///
/// Cheaply cloneable; clones share state. On construction the store
/// follows the client's connectivity: a successful connect triggers a
/// background collection refresh on the ambient tokio runtime.
#[derive(Clone)]
pub struct AppStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    client: ApiClient,
    state: Mutex<AppState>,
    listeners: Listeners<AppState>,
    watch: watch::Sender<AppState>,
    /// Held for its drop: the store stops following the client.
    _connectivity: Subscription,
}

impl AppStore {
    pub fn new(client: ApiClient) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<StoreInner>| {
            let weak = weak.clone();
            let connectivity = client.on_connection_change(move |connected| {
                if let Some(inner) = weak.upgrade() {
                    AppStore { inner }.on_connectivity(*connected);
                }
            });

            let initial = AppState {
                is_connected: client.is_connected(),
                current_collection_name: client.current_collection_name(),
                ..AppState::default()
            };
            let (watch, _) = watch::channel(initial.clone());

            StoreInner {
                client,
                state: Mutex::new(initial),
                listeners: Listeners::new(),
                watch,
                _connectivity: connectivity,
            }
        });
        Self { inner }
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ── Reading ──────────────────────────────────────────────────────

    /// Independent copy of the current snapshot.
    pub fn state(&self) -> AppState {
        self.lock().clone()
    }

    /// Call `listener` now with the current snapshot, then once per change.
    pub fn subscribe(
        &self,
        listener: impl Fn(&AppState) + Send + Sync + 'static,
    ) -> Subscription {
        listener(&self.state());
        self.inner.listeners.subscribe(listener)
    }

    /// Async view of the snapshot.
    pub fn watch(&self) -> watch::Receiver<AppState> {
        self.inner.watch.subscribe()
    }

    // ── Mutations ────────────────────────────────────────────────────

    fn update(&self, f: impl FnOnce(&mut AppState)) {
        let snapshot = {
            let mut state = self.lock();
            let mut next = state.clone();
            f(&mut next);
            *state = next.clone();
            next
        };
        self.inner.watch.send_replace(snapshot.clone());
        self.inner.listeners.notify(&snapshot);
    }

    /// Select a method, seed the editor with its example, clear the result.
    pub fn select_method(&self, method: &'static ApiMethod) {
        let json = method.example_json();
        self.update(|s| {
            s.current_method = Some(method);
            s.parameter_json = json;
            s.last_result = None;
        });
    }

    /// Store editor text verbatim; validity is checked at execution time.
    pub fn set_parameter_json(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|s| s.parameter_json = text);
    }

    pub fn set_executing(&self, executing: bool) {
        self.update(|s| s.is_executing = executing);
    }

    /// Record a settled call. Also leaves the executing state.
    pub fn set_result(&self, result: ApiResult<Value>) {
        self.update(|s| {
            s.last_result = Some(result);
            s.is_executing = false;
        });
    }

    pub fn set_current_collection(&self, name: Option<String>) {
        self.update(|s| s.current_collection_name = name);
    }

    /// Re-fetch collection names. No-op while disconnected; failures are
    /// logged and leave the state untouched.
    pub async fn refresh_collections(&self) {
        if !self.inner.client.is_connected() {
            return;
        }

        let result = self.inner.client.list_collections(None, None).await;
        match result.data {
            Some(collections) if result.success => {
                let names: Vec<String> = collections.into_iter().map(|c| c.name).collect();
                let current = self.inner.client.current_collection_name();
                debug!(count = names.len(), "collections refreshed");
                self.update(|s| {
                    s.collections = names;
                    s.current_collection_name = current;
                });
            }
            _ => {
                warn!(
                    error = result.error.as_deref().unwrap_or("unknown error"),
                    "failed to refresh collections"
                );
            }
        }
    }

    fn on_connectivity(&self, connected: bool) {
        if connected {
            self.update(|s| s.is_connected = true);
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let store = self.clone();
                    handle.spawn(async move { store.refresh_collections().await });
                }
                Err(_) => warn!("no async runtime; skipping collection refresh"),
            }
        } else {
            let current = self.inner.client.current_collection_name();
            self.update(|s| {
                s.is_connected = false;
                s.current_collection_name = current;
            });
        }
    }
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}
