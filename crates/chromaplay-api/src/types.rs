// Wire types for the Chroma v2 REST API.
//
// Request bodies use the server's snake_case field names and omit
// absent optional fields entirely. Response types keep any fields we
// don't model in `extra` so nothing is lost when re-serialized for display.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form metadata attached to collections and records.
pub type Metadata = Map<String, Value>;

// ── Server probes ───────────────────────────────────────────────────

/// Response of `GET /api/v2/heartbeat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    #[serde(rename = "nanosecond heartbeat", alias = "nanosecond_heartbeat")]
    pub nanosecond_heartbeat: u64,
}

// ── Collections ─────────────────────────────────────────────────────

/// A collection as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Server-assigned id; addresses all record-level endpoints.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Body of `POST .../collections`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub metadata: Metadata,
    pub get_or_create: bool,
}

/// Body of `PUT /api/v2/collections/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateCollectionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_metadata: Option<Metadata>,
}

// ── Records ─────────────────────────────────────────────────────────

/// Fields the server may include in get/query responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Include {
    Documents,
    Metadatas,
    Distances,
    Embeddings,
    Uris,
}

/// Body shared by add, upsert and update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordsRequest {
    pub ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<Vec<Vec<f32>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadatas: Option<Vec<Metadata>>,
}

/// Body of `POST /api/v2/collections/{id}/get`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetRecordsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_document: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    pub include: Vec<Include>,
}

/// Body of `POST /api/v2/collections/{id}/query`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_texts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_embeddings: Option<Vec<Vec<f32>>>,
    pub n_results: u32,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_document: Option<Metadata>,
    pub include: Vec<Include>,
}

/// Body of `POST /api/v2/collections/{id}/delete`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteRecordsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_document: Option<Metadata>,
}

/// Response of the get endpoint (also used for peek).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GetResponse {
    pub ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadatas: Option<Vec<Option<Metadata>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<Vec<Vec<f32>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of the query endpoint: one inner list per query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    pub ids: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distances: Option<Vec<Vec<Option<f32>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<Vec<Vec<Vec<f32>>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
