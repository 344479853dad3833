// ── Typed parameter structs for Command payloads ──
//
// Field names follow the camelCase parameter names of the method registry.
// Each struct knows how to turn itself into the snake_case wire body,
// applying the defaults the server would otherwise not assume.

use serde::{Deserialize, Serialize};

use chromaplay_api::{
    CreateCollectionRequest, DeleteRecordsRequest, GetRecordsRequest, Include, Metadata,
    QueryRequest, RecordsRequest, UpdateCollectionRequest,
};

pub const DEFAULT_N_RESULTS: u32 = 10;
pub const DEFAULT_PEEK_LIMIT: u32 = 10;

pub(crate) const GET_INCLUDE: [Include; 2] = [Include::Documents, Include::Metadatas];
pub(crate) const QUERY_INCLUDE: [Include; 3] =
    [Include::Documents, Include::Metadatas, Include::Distances];

// ── Client ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListCollectionsParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

// ── Collection management ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionNameParams {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCollectionParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl CreateCollectionParams {
    /// Wire body. Missing metadata is sent as an empty object.
    pub fn into_request(self, get_or_create: bool) -> CreateCollectionRequest {
        CreateCollectionRequest {
            name: self.name,
            metadata: self.metadata.unwrap_or_default(),
            get_or_create,
        }
    }
}

// ── Records ────────────────────────────────────────────────────────

/// Shared by add, upsert and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordsParams {
    pub ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<Vec<Vec<f32>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadatas: Option<Vec<Metadata>>,
}

impl From<RecordsParams> for RecordsRequest {
    fn from(p: RecordsParams) -> Self {
        Self {
            ids: p.ids,
            documents: p.documents,
            embeddings: p.embeddings,
            metadatas: p.metadatas,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_document: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<Include>>,
}

impl From<GetParams> for GetRecordsRequest {
    fn from(p: GetParams) -> Self {
        Self {
            ids: p.ids,
            where_metadata: p.where_metadata,
            where_document: p.where_document,
            limit: p.limit,
            offset: p.offset,
            include: p.include.unwrap_or_else(|| GET_INCLUDE.to_vec()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_texts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_embeddings: Option<Vec<Vec<f32>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_results: Option<u32>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_document: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<Include>>,
}

impl From<QueryParams> for QueryRequest {
    fn from(p: QueryParams) -> Self {
        Self {
            query_texts: p.query_texts,
            query_embeddings: p.query_embeddings,
            // Zero results is never useful; treat it like "unset".
            n_results: p.n_results.filter(|n| *n > 0).unwrap_or(DEFAULT_N_RESULTS),
            where_metadata: p.where_metadata,
            where_document: p.where_document,
            include: p.include.unwrap_or_else(|| QUERY_INCLUDE.to_vec()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_document: Option<Metadata>,
}

impl From<DeleteParams> for DeleteRecordsRequest {
    fn from(p: DeleteParams) -> Self {
        Self {
            ids: p.ids,
            where_metadata: p.where_metadata,
            where_document: p.where_document,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeekParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl From<PeekParams> for GetRecordsRequest {
    fn from(p: PeekParams) -> Self {
        Self {
            limit: Some(p.limit.filter(|n| *n > 0).unwrap_or(DEFAULT_PEEK_LIMIT)),
            include: GET_INCLUDE.to_vec(),
            ..Self::default()
        }
    }
}

/// Rename and/or replace metadata of the current collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifyParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl From<&ModifyParams> for UpdateCollectionRequest {
    fn from(p: &ModifyParams) -> Self {
        Self {
            new_name: p.name.clone(),
            new_metadata: p.metadata.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn query_defaults() {
        let req: QueryRequest = QueryParams {
            query_texts: Some(vec!["hi".into()]),
            ..QueryParams::default()
        }
        .into();
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "query_texts": ["hi"],
                "n_results": 10,
                "include": ["documents", "metadatas", "distances"]
            })
        );
    }

    #[test]
    fn query_params_accept_camel_case() {
        let p: QueryParams = serde_json::from_value(json!({
            "queryTexts": ["a"],
            "nResults": 3,
            "where": { "k": "v" },
            "whereDocument": { "$contains": "x" }
        }))
        .unwrap();
        let req = QueryRequest::from(p);
        assert_eq!(req.n_results, 3);
        assert_eq!(
            serde_json::to_value(&req).unwrap()["where_document"],
            json!({ "$contains": "x" })
        );
    }

    #[test]
    fn get_defaults_include_documents_and_metadatas() {
        let req = GetRecordsRequest::from(GetParams {
            ids: Some(vec!["a".into()]),
            ..GetParams::default()
        });
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "ids": ["a"], "include": ["documents", "metadatas"] })
        );

        let explicit = GetRecordsRequest::from(GetParams {
            include: Some(vec![Include::Embeddings]),
            ..GetParams::default()
        });
        assert_eq!(explicit.include, vec![Include::Embeddings]);
    }

    #[test]
    fn peek_defaults_to_ten() {
        let req = GetRecordsRequest::from(PeekParams::default());
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "limit": 10, "include": ["documents", "metadatas"] })
        );
    }

    #[test]
    fn create_sends_empty_metadata() {
        let req = CreateCollectionParams {
            name: "foo".into(),
            metadata: None,
        }
        .into_request(false);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "name": "foo", "metadata": {}, "get_or_create": false })
        );
    }

    #[test]
    fn records_require_ids() {
        let err = serde_json::from_value::<RecordsParams>(json!({ "documents": ["x"] }));
        assert!(err.is_err());
    }
}
