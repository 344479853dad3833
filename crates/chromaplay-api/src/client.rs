// Hand-crafted async HTTP client for the Chroma REST API (v2).
//
// Base path: /api/v2/
// Auth: optional `Authorization: Bearer <token>` on every request

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{
    Collection, CreateCollectionRequest, DeleteRecordsRequest, GetRecordsRequest, GetResponse,
    Heartbeat, QueryRequest, QueryResponse, RecordsRequest, UpdateCollectionRequest,
};

// ── Namespace ────────────────────────────────────────────────────────

/// Tenant + database pair that scopes collection-level endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub tenant: String,
    pub database: String,
}

impl Namespace {
    pub fn new(tenant: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            database: database.into(),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Chroma v2 REST API.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference-counted.
/// Holds no session state beyond the optional bearer token.
#[derive(Debug, Clone)]
pub struct ChromaClient {
    http: reqwest::Client,
    base_url: Url,
    bearer: Option<SecretString>,
}

impl ChromaClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a server URL (e.g. `http://localhost:8000`) and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url,
            bearer: None,
        })
    }

    /// Attach (or clear) the bearer token. Empty tokens count as absent.
    pub fn with_bearer_token(mut self, token: Option<SecretString>) -> Self {
        self.bearer = token.filter(|t| !t.expose_secret().is_empty());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append `api/v2/<segments…>` to the base URL, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Infallible: `from_reqwest` rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v2"]).extend(segments);
        }
        url
    }

    fn collections_url(&self, ns: &Namespace, rest: &[&str]) -> Url {
        let mut segments = vec![
            "tenants",
            ns.tenant.as_str(),
            "databases",
            ns.database.as_str(),
        ];
        segments.extend_from_slice(rest);
        self.url(&segments)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{method} {url}");
        let builder = self
            .http
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        match &self.bearer {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let resp = self.request(Method::GET, url).send().await?;
        handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let resp = self.request(Method::GET, url).query(params).send().await?;
        handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        let resp = self.request(Method::POST, url).json(body).send().await?;
        handle_response(resp).await
    }

    async fn post_no_response<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<(), Error> {
        let resp = self.request(Method::POST, url).json(body).send().await?;
        handle_empty(resp).await
    }

    async fn put_no_response<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<(), Error> {
        let resp = self.request(Method::PUT, url).json(body).send().await?;
        handle_empty(resp).await
    }

    async fn delete(&self, url: Url) -> Result<(), Error> {
        let resp = self.request(Method::DELETE, url).send().await?;
        handle_empty(resp).await
    }

    // ── Server ───────────────────────────────────────────────────────

    // Read endpoints return `None` when a 2xx arrives with an empty body.

    pub async fn heartbeat(&self) -> Result<Option<Heartbeat>, Error> {
        self.get(self.url(&["heartbeat"])).await
    }

    pub async fn version(&self) -> Result<Option<String>, Error> {
        self.get(self.url(&["version"])).await
    }

    /// Wipe all server-side data. Requires `ALLOW_RESET` on the server.
    pub async fn reset(&self) -> Result<Value, Error> {
        let resp = self
            .request(Method::POST, self.url(&["reset"]))
            .send()
            .await?;
        handle_response(resp).await
    }

    // ── Collections ──────────────────────────────────────────────────

    /// List collections; `limit`/`offset` are only sent when given. An
    /// empty body lists nothing.
    pub async fn list_collections(
        &self,
        ns: &Namespace,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Collection>, Error> {
        let mut params = Vec::new();
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = offset {
            params.push(("offset", offset.to_string()));
        }
        let url = self.collections_url(ns, &["collections"]);
        let listed: Option<Vec<Collection>> = if params.is_empty() {
            self.get(url).await?
        } else {
            self.get_with_params(url, &params).await?
        };
        Ok(listed.unwrap_or_default())
    }

    pub async fn count_collections(&self, ns: &Namespace) -> Result<Option<u64>, Error> {
        self.get(self.collections_url(ns, &["count_collections"]))
            .await
    }

    /// Create (or, with `get_or_create`, fetch) a collection.
    pub async fn create_collection(
        &self,
        ns: &Namespace,
        body: &CreateCollectionRequest,
    ) -> Result<Collection, Error> {
        self.post(self.collections_url(ns, &["collections"]), body)
            .await
    }

    pub async fn get_collection(&self, ns: &Namespace, name: &str) -> Result<Collection, Error> {
        self.get(self.collections_url(ns, &["collections", name]))
            .await
    }

    pub async fn delete_collection(&self, ns: &Namespace, name: &str) -> Result<(), Error> {
        self.delete(self.collections_url(ns, &["collections", name]))
            .await
    }

    /// Rename a collection and/or replace its metadata.
    pub async fn update_collection(
        &self,
        collection_id: &str,
        body: &UpdateCollectionRequest,
    ) -> Result<(), Error> {
        self.put_no_response(self.url(&["collections", collection_id]), body)
            .await
    }

    // ── Records ──────────────────────────────────────────────────────

    pub async fn add(&self, collection_id: &str, body: &RecordsRequest) -> Result<(), Error> {
        self.post_no_response(self.url(&["collections", collection_id, "add"]), body)
            .await
    }

    pub async fn upsert(&self, collection_id: &str, body: &RecordsRequest) -> Result<(), Error> {
        self.post_no_response(self.url(&["collections", collection_id, "upsert"]), body)
            .await
    }

    pub async fn update(&self, collection_id: &str, body: &RecordsRequest) -> Result<(), Error> {
        self.post_no_response(self.url(&["collections", collection_id, "update"]), body)
            .await
    }

    pub async fn get_records(
        &self,
        collection_id: &str,
        body: &GetRecordsRequest,
    ) -> Result<Option<GetResponse>, Error> {
        self.post(self.url(&["collections", collection_id, "get"]), body)
            .await
    }

    pub async fn query(
        &self,
        collection_id: &str,
        body: &QueryRequest,
    ) -> Result<Option<QueryResponse>, Error> {
        self.post(self.url(&["collections", collection_id, "query"]), body)
            .await
    }

    /// Delete records by id and/or filter. The response shape varies by
    /// server version, so it is passed through untouched.
    pub async fn delete_records(
        &self,
        collection_id: &str,
        body: &DeleteRecordsRequest,
    ) -> Result<Value, Error> {
        self.post(self.url(&["collections", collection_id, "delete"]), body)
            .await
    }

    pub async fn count(&self, collection_id: &str) -> Result<Option<u64>, Error> {
        self.get(self.url(&["collections", collection_id, "count"]))
            .await
    }
}

// ── Response handling ────────────────────────────────────────────────

/// Decode a success body; an empty body decodes as JSON `null`.
async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if !status.is_success() {
        return Err(parse_error(status, resp).await);
    }

    let body = resp.text().await?;
    let parsed = if body.trim().is_empty() {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_str(&body)
    };
    parsed.map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();
    Error::Http {
        status: status.as_u16(),
        message: error_message(status, &raw),
    }
}

/// Two-stage extraction: a `detail` or `message` field from a JSON body,
/// then the raw body text, then `HTTP <status>`.
pub(crate) fn error_message(status: StatusCode, raw: &str) -> String {
    if let Ok(Value::Object(body)) = serde_json::from_str::<Value>(raw) {
        for key in ["detail", "message"] {
            match body.get(key) {
                Some(Value::String(s)) if !s.is_empty() => return s.clone(),
                Some(Value::Null | Value::String(_)) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }

    if raw.trim().is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        raw.to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ChromaClient {
        ChromaClient::from_reqwest(base, reqwest::Client::new()).expect("valid base URL")
    }

    #[test]
    fn url_appends_api_prefix() {
        let c = client("http://localhost:8000");
        assert_eq!(
            c.url(&["heartbeat"]).as_str(),
            "http://localhost:8000/api/v2/heartbeat"
        );
    }

    #[test]
    fn url_keeps_base_path_and_encodes_segments() {
        let c = client("http://proxy.local/chroma/");
        let ns = Namespace::new("acme", "main db");
        assert_eq!(
            c.collections_url(&ns, &["collections", "a/b"]).as_str(),
            "http://proxy.local/chroma/api/v2/tenants/acme/databases/main%20db/collections/a%2Fb"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        let result = ChromaClient::from_reqwest("mailto:ops@example.com", reqwest::Client::new());
        assert!(matches!(result, Err(Error::InvalidBaseUrl(_))));
    }

    #[test]
    fn empty_bearer_token_is_dropped() {
        let c = client("http://localhost:8000").with_bearer_token(Some(SecretString::from("")));
        assert!(c.bearer.is_none());
    }

    #[test]
    fn error_message_prefers_detail_then_message() {
        let s = StatusCode::BAD_REQUEST;
        assert_eq!(
            error_message(s, r#"{"detail":"bad name","message":"ignored"}"#),
            "bad name"
        );
        assert_eq!(
            error_message(s, r#"{"error":"NotFoundError","message":"no such collection"}"#),
            "no such collection"
        );
    }

    #[test]
    fn error_message_falls_back_to_raw_then_status() {
        let s = StatusCode::INTERNAL_SERVER_ERROR;
        assert_eq!(error_message(s, "upstream exploded"), "upstream exploded");
        assert_eq!(error_message(s, r#"{"error":"x"}"#), r#"{"error":"x"}"#);
        assert_eq!(error_message(s, ""), "HTTP 500");
    }

    #[test]
    fn error_message_renders_structured_detail() {
        let s = StatusCode::UNPROCESSABLE_ENTITY;
        let msg = error_message(s, r#"{"detail":[{"loc":["body","name"]}]}"#);
        assert!(msg.starts_with('['), "got {msg}");
    }
}
