// ── Session-aware API client ──
//
// Stateful facade over `ChromaClient`: owns the connection config and the
// "current collection" context, times every call into an `ApiResult`, and
// is the only publisher of connectivity changes.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use chromaplay_api::{
    ChromaClient, Collection, GetRecordsRequest, GetResponse, Metadata, Namespace, QueryResponse,
    TransportConfig, UpdateCollectionRequest,
};

use crate::command::{
    Command, CreateCollectionParams, DeleteParams, GetParams, ModifyParams, PeekParams,
    QueryParams, RecordsParams,
};
use crate::config::{ClientOptions, ConnectionConfig, ConnectionUpdate};
use crate::error::CoreError;
use crate::observe::{Listeners, Subscription};
use crate::registry::MethodId;
use crate::result::ApiResult;

// ── ApiClient ────────────────────────────────────────────────────────

/// Session facade for one Chroma server.
///
/// Cheaply cloneable via `Arc<ClientInner>`; clones share the session.
/// Public operations never return `Err` and never panic: every failure
/// lands in the returned [`ApiResult`].
///
/// Overlapping calls that each adopt a current collection (create, get,
/// get-or-create) race; whichever settles last wins. Callers that care
/// must serialize those calls themselves.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    options: ClientOptions,
    /// Token-less client; cloned and re-tokened on every `connect`.
    base: ChromaClient,
    session: Mutex<Session>,
    listeners: Listeners<bool>,
}

struct Session {
    config: ConnectionConfig,
    api: ChromaClient,
    current: Option<CurrentCollection>,
    connected: bool,
}

/// The adopted collection plus the namespace it was resolved in.
#[derive(Clone)]
struct CurrentCollection {
    collection: Collection,
    namespace: Namespace,
}

impl ApiClient {
    /// Build a disconnected client. Fails only if the base URL cannot
    /// address `/api/v2` or the HTTP client cannot be constructed.
    pub fn new(options: ClientOptions) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: options.timeout,
        };
        let base = ChromaClient::new(options.url.as_str(), &transport)?;
        Ok(Self::from_parts(options, base))
    }

    /// Wrap an existing HTTP client (tests, custom TLS).
    pub fn with_http(options: ClientOptions, http: reqwest::Client) -> Result<Self, CoreError> {
        let base = ChromaClient::from_reqwest(options.url.as_str(), http)?;
        Ok(Self::from_parts(options, base))
    }

    fn from_parts(options: ClientOptions, base: ChromaClient) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                options,
                session: Mutex::new(Session {
                    config: ConnectionConfig::default(),
                    api: base.clone(),
                    current: None,
                    connected: false,
                }),
                base,
                listeners: Listeners::new(),
            }),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Client and namespace for the next request.
    fn target(&self) -> (ChromaClient, Namespace) {
        let s = self.session();
        (s.api.clone(), namespace_of(&s.config))
    }

    fn require_collection(&self) -> Result<(ChromaClient, String), CoreError> {
        let s = self.session();
        let id = s
            .current
            .as_ref()
            .map(|c| c.collection.id.clone())
            .ok_or(CoreError::NoCollectionSelected)?;
        Ok((s.api.clone(), id))
    }

    fn adopt(&self, collection: &Collection, namespace: Namespace) {
        debug!(name = %collection.name, id = %collection.id, "current collection set");
        self.session().current = Some(CurrentCollection {
            collection: collection.clone(),
            namespace,
        });
    }

    fn clear_current(&self) {
        self.session().current = None;
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// A copy of the stored connection config.
    pub fn config(&self) -> ConnectionConfig {
        self.session().config.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.session().connected
    }

    pub fn current_collection(&self) -> Option<Collection> {
        self.session().current.as_ref().map(|c| c.collection.clone())
    }

    pub fn current_collection_name(&self) -> Option<String> {
        self.session()
            .current
            .as_ref()
            .map(|c| c.collection.name.clone())
    }

    pub fn current_collection_id(&self) -> Option<String> {
        self.session()
            .current
            .as_ref()
            .map(|c| c.collection.id.clone())
    }

    /// Register a connectivity listener. Called with `true` after every
    /// successful `connect`, `false` on `disconnect` or a failed reconnect.
    pub fn on_connection_change(
        &self,
        listener: impl Fn(&bool) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.listeners.subscribe(listener)
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Merge `update` into the stored config and probe the heartbeat.
    ///
    /// The config is updated even when the probe fails. Reconnecting to a
    /// different tenant or database drops the current collection.
    pub async fn connect(&self, update: ConnectionUpdate) -> ApiResult<bool> {
        let (api, namespace) = {
            let mut s = self.session();
            s.config.merge(update);
            s.api = self
                .inner
                .base
                .clone()
                .with_bearer_token(s.config.auth_token.clone());
            (s.api.clone(), namespace_of(&s.config))
        };

        let started = Instant::now();
        let outcome = api.heartbeat().await.map_err(CoreError::from);

        match &outcome {
            Ok(_) => {
                {
                    let mut s = self.session();
                    s.connected = true;
                    if s.current.as_ref().is_some_and(|c| c.namespace != namespace) {
                        s.current = None;
                    }
                }
                info!(
                    url = %self.inner.options.url,
                    tenant = %namespace.tenant,
                    database = %namespace.database,
                    "connected"
                );
                self.inner.listeners.notify(&true);
            }
            Err(e) => {
                let was_connected = {
                    let mut s = self.session();
                    s.current = None;
                    std::mem::replace(&mut s.connected, false)
                };
                warn!(url = %self.inner.options.url, error = %e, "connection failed");
                if was_connected {
                    self.inner.listeners.notify(&false);
                }
            }
        }

        ApiResult::from_outcome(outcome.map(|_| true), started)
    }

    /// Drop the session context. No network call.
    pub fn disconnect(&self) {
        {
            let mut s = self.session();
            s.current = None;
            s.connected = false;
        }
        info!("disconnected");
        self.inner.listeners.notify(&false);
    }

    // ── Server ───────────────────────────────────────────────────────

    pub async fn heartbeat(&self) -> ApiResult<chromaplay_api::Heartbeat> {
        let (api, _) = self.target();
        run_optional(MethodId::Heartbeat, async move { Ok(api.heartbeat().await?) })
            .await
    }

    pub async fn version(&self) -> ApiResult<String> {
        let (api, _) = self.target();
        run_optional(MethodId::Version, async move { Ok(api.version().await?) })
            .await
    }

    /// Wipe the server. Clears the current collection on success.
    pub async fn reset(&self) -> ApiResult<bool> {
        let (api, _) = self.target();
        run(MethodId::Reset, async move {
            api.reset().await?;
            self.clear_current();
            Ok(true)
        })
        .await
    }

    pub async fn list_collections(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> ApiResult<Vec<Collection>> {
        let (api, ns) = self.target();
        run(MethodId::ListCollections, async move {
            Ok(api.list_collections(&ns, limit, offset).await?)
        })
        .await
    }

    pub async fn count_collections(&self) -> ApiResult<u64> {
        let (api, ns) = self.target();
        run_optional(MethodId::CountCollections, async move {
            Ok(api.count_collections(&ns).await?)
        })
        .await
    }

    // ── Collection management ────────────────────────────────────────

    /// Create a collection and make it current.
    pub async fn create_collection(
        &self,
        name: &str,
        metadata: Option<Metadata>,
    ) -> ApiResult<Collection> {
        self.create_or_get(MethodId::CreateCollection, name, metadata, false)
            .await
    }

    /// Fetch a collection, creating it if absent, and make it current.
    /// Whether `metadata` is applied to an existing collection is up to
    /// the server.
    pub async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: Option<Metadata>,
    ) -> ApiResult<Collection> {
        self.create_or_get(MethodId::GetOrCreateCollection, name, metadata, true)
            .await
    }

    async fn create_or_get(
        &self,
        op: MethodId,
        name: &str,
        metadata: Option<Metadata>,
        get_or_create: bool,
    ) -> ApiResult<Collection> {
        let (api, ns) = self.target();
        let body = CreateCollectionParams {
            name: name.to_owned(),
            metadata,
        }
        .into_request(get_or_create);
        run(op, async move {
            let collection = api.create_collection(&ns, &body).await?;
            self.adopt(&collection, ns);
            Ok(collection)
        })
        .await
    }

    /// Fetch a collection by name and make it current.
    pub async fn get_collection(&self, name: &str) -> ApiResult<Collection> {
        let (api, ns) = self.target();
        run(MethodId::GetCollection, async move {
            let collection = api.get_collection(&ns, name).await?;
            self.adopt(&collection, ns);
            Ok(collection)
        })
        .await
    }

    /// Same as [`get_collection`](Self::get_collection).
    pub async fn select_collection(&self, name: &str) -> ApiResult<Collection> {
        self.get_collection(name).await
    }

    /// Delete a collection. Clears the context if it was the current one.
    pub async fn delete_collection(&self, name: &str) -> ApiResult<()> {
        let (api, ns) = self.target();
        run(MethodId::DeleteCollection, async move {
            api.delete_collection(&ns, name).await?;
            let mut s = self.session();
            if s.current.as_ref().is_some_and(|c| c.collection.name == name) {
                s.current = None;
            }
            Ok(())
        })
        .await
    }

    // ── Collection operations ────────────────────────────────────────

    pub async fn add(&self, params: RecordsParams) -> ApiResult<bool> {
        run(MethodId::Add, async move {
            let (api, id) = self.require_collection()?;
            api.add(&id, &params.into()).await?;
            Ok(true)
        })
        .await
    }

    pub async fn upsert(&self, params: RecordsParams) -> ApiResult<bool> {
        run(MethodId::Upsert, async move {
            let (api, id) = self.require_collection()?;
            api.upsert(&id, &params.into()).await?;
            Ok(true)
        })
        .await
    }

    pub async fn update(&self, params: RecordsParams) -> ApiResult<bool> {
        run(MethodId::Update, async move {
            let (api, id) = self.require_collection()?;
            api.update(&id, &params.into()).await?;
            Ok(true)
        })
        .await
    }

    /// Fetch records. Include defaults to documents and metadatas.
    pub async fn get(&self, params: GetParams) -> ApiResult<GetResponse> {
        run_optional(MethodId::Get, async move {
            let (api, id) = self.require_collection()?;
            Ok(api.get_records(&id, &params.into()).await?)
        })
        .await
    }

    /// Similarity search. Defaults: 10 results; documents, metadatas and
    /// distances included.
    pub async fn query(&self, params: QueryParams) -> ApiResult<QueryResponse> {
        run_optional(MethodId::Query, async move {
            let (api, id) = self.require_collection()?;
            Ok(api.query(&id, &params.into()).await?)
        })
        .await
    }

    pub async fn delete(&self, params: DeleteParams) -> ApiResult<Value> {
        run(MethodId::Delete, async move {
            let (api, id) = self.require_collection()?;
            Ok(api.delete_records(&id, &params.into()).await?)
        })
        .await
    }

    /// First `limit` records (default 10).
    pub async fn peek(&self, params: PeekParams) -> ApiResult<GetResponse> {
        run_optional(MethodId::Peek, async move {
            let (api, id) = self.require_collection()?;
            let body = GetRecordsRequest::from(params);
            Ok(api.get_records(&id, &body).await?)
        })
        .await
    }

    pub async fn count(&self) -> ApiResult<u64> {
        run_optional(MethodId::Count, async move {
            let (api, id) = self.require_collection()?;
            Ok(api.count(&id).await?)
        })
        .await
    }

    /// Rename and/or replace metadata of the current collection, then
    /// mirror the change in the cached context.
    pub async fn modify(&self, params: ModifyParams) -> ApiResult<()> {
        run(MethodId::Modify, async move {
            let (api, id) = self.require_collection()?;
            api.update_collection(&id, &UpdateCollectionRequest::from(&params))
                .await?;

            let mut s = self.session();
            if let Some(current) = s.current.as_mut().filter(|c| c.collection.id == id) {
                if let Some(name) = params.name {
                    current.collection.name = name;
                }
                if let Some(metadata) = params.metadata {
                    current.collection.metadata = Some(metadata);
                }
            }
            Ok(())
        })
        .await
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Dispatch by string id with raw JSON parameters.
    ///
    /// Unknown ids and undecodable parameters fail with zero duration and
    /// no request sent.
    pub async fn execute_method(&self, id: &str, params: Value) -> ApiResult<Value> {
        let Ok(method) = id.parse::<MethodId>() else {
            return ApiResult::rejected(&CoreError::UnknownMethod(id.to_owned()));
        };
        match Command::from_method(method, params) {
            Ok(command) => self.execute(command).await,
            Err(e) => ApiResult::rejected(&e),
        }
    }

    /// Run a decoded command and erase its payload type.
    pub async fn execute(&self, command: Command) -> ApiResult<Value> {
        match command {
            Command::Heartbeat => self.heartbeat().await.into_json(),
            Command::Version => self.version().await.into_json(),
            Command::Reset => self.reset().await.into_json(),
            Command::ListCollections(p) => {
                self.list_collections(p.limit, p.offset).await.into_json()
            }
            Command::CountCollections => self.count_collections().await.into_json(),
            Command::CreateCollection(p) => {
                self.create_collection(&p.name, p.metadata).await.into_json()
            }
            Command::GetCollection(p) => self.get_collection(&p.name).await.into_json(),
            Command::GetOrCreateCollection(p) => self
                .get_or_create_collection(&p.name, p.metadata)
                .await
                .into_json(),
            Command::DeleteCollection(p) => self.delete_collection(&p.name).await.into_json(),
            Command::Add(p) => self.add(p).await.into_json(),
            Command::Upsert(p) => self.upsert(p).await.into_json(),
            Command::Get(p) => self.get(p).await.into_json(),
            Command::Query(p) => self.query(p).await.into_json(),
            Command::Update(p) => self.update(p).await.into_json(),
            Command::Delete(p) => self.delete(p).await.into_json(),
            Command::Peek(p) => self.peek(p).await.into_json(),
            Command::Count => self.count().await.into_json(),
            Command::Modify(p) => self.modify(p).await.into_json(),
        }
    }
}

// ── Execution wrapper ────────────────────────────────────────────

/// Time `body` and fold its outcome into an `ApiResult`.
async fn run<T, F>(op: MethodId, body: F) -> ApiResult<T>
where
    F: Future<Output = Result<T, CoreError>>,
{
    let started = Instant::now();
    traced(op, ApiResult::from_outcome(body.await, started))
}

/// `run` for endpoints whose 2xx body may be empty.
async fn run_optional<T, F>(op: MethodId, body: F) -> ApiResult<T>
where
    F: Future<Output = Result<Option<T>, CoreError>>,
{
    let started = Instant::now();
    traced(op, ApiResult::from_optional(body.await, started))
}

fn traced<T>(op: MethodId, result: ApiResult<T>) -> ApiResult<T> {
    match &result.error {
        None => debug!(method = %op, elapsed_ms = result.duration, "call succeeded"),
        Some(e) => debug!(method = %op, elapsed_ms = result.duration, error = %e, "call failed"),
    }
    result
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.session();
        f.debug_struct("ApiClient")
            .field("url", &self.inner.options.url.as_str())
            .field("config", &s.config)
            .field("connected", &s.connected)
            .field(
                "current_collection",
                &s.current.as_ref().map(|c| c.collection.name.as_str()),
            )
            .finish_non_exhaustive()
    }
}

fn namespace_of(config: &ConnectionConfig) -> Namespace {
    Namespace::new(config.tenant(), config.database())
}
