// ── Command API ──
//
// Every invocable method maps to exactly one `Command` variant. Decoding
// from a method id plus a raw JSON payload is an exhaustive match, so a
// registry entry cannot exist without a typed decoder.

pub mod requests;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CoreError;
use crate::registry::MethodId;

pub use requests::{
    CollectionNameParams, CreateCollectionParams, DeleteParams, GetParams, ListCollectionsParams,
    ModifyParams, PeekParams, QueryParams, RecordsParams,
};

/// A fully decoded API call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ── Client ───────────────────────────────────────────────────────
    Heartbeat,
    Version,
    Reset,
    ListCollections(ListCollectionsParams),
    CountCollections,

    // ── Collection management ────────────────────────────────────────
    CreateCollection(CreateCollectionParams),
    GetCollection(CollectionNameParams),
    GetOrCreateCollection(CreateCollectionParams),
    DeleteCollection(CollectionNameParams),

    // ── Collection operations ────────────────────────────────────────
    Add(RecordsParams),
    Upsert(RecordsParams),
    Get(GetParams),
    Query(QueryParams),
    Update(RecordsParams),
    Delete(DeleteParams),
    Peek(PeekParams),
    Count,
    Modify(ModifyParams),
}

impl Command {
    /// Decode `params` into the typed command for `id`.
    ///
    /// `null` is treated as `{}`. Methods without parameters ignore the
    /// payload entirely.
    pub fn from_method(id: MethodId, params: Value) -> Result<Self, CoreError> {
        let params = if params.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            params
        };

        Ok(match id {
            MethodId::Heartbeat => Self::Heartbeat,
            MethodId::Version => Self::Version,
            MethodId::Reset => Self::Reset,
            MethodId::ListCollections => Self::ListCollections(decode(id, params)?),
            MethodId::CountCollections => Self::CountCollections,
            MethodId::CreateCollection => Self::CreateCollection(decode(id, params)?),
            MethodId::GetCollection => Self::GetCollection(decode(id, params)?),
            MethodId::GetOrCreateCollection => Self::GetOrCreateCollection(decode(id, params)?),
            MethodId::DeleteCollection => Self::DeleteCollection(decode(id, params)?),
            MethodId::Add => Self::Add(decode(id, params)?),
            MethodId::Upsert => Self::Upsert(decode(id, params)?),
            MethodId::Get => Self::Get(decode(id, params)?),
            MethodId::Query => Self::Query(decode(id, params)?),
            MethodId::Update => Self::Update(decode(id, params)?),
            MethodId::Delete => Self::Delete(decode(id, params)?),
            MethodId::Peek => Self::Peek(decode(id, params)?),
            MethodId::Count => Self::Count,
            MethodId::Modify => Self::Modify(decode(id, params)?),
        })
    }

    pub fn method_id(&self) -> MethodId {
        match self {
            Self::Heartbeat => MethodId::Heartbeat,
            Self::Version => MethodId::Version,
            Self::Reset => MethodId::Reset,
            Self::ListCollections(_) => MethodId::ListCollections,
            Self::CountCollections => MethodId::CountCollections,
            Self::CreateCollection(_) => MethodId::CreateCollection,
            Self::GetCollection(_) => MethodId::GetCollection,
            Self::GetOrCreateCollection(_) => MethodId::GetOrCreateCollection,
            Self::DeleteCollection(_) => MethodId::DeleteCollection,
            Self::Add(_) => MethodId::Add,
            Self::Upsert(_) => MethodId::Upsert,
            Self::Get(_) => MethodId::Get,
            Self::Query(_) => MethodId::Query,
            Self::Update(_) => MethodId::Update,
            Self::Delete(_) => MethodId::Delete,
            Self::Peek(_) => MethodId::Peek,
            Self::Count => MethodId::Count,
            Self::Modify(_) => MethodId::Modify,
        }
    }
}

fn decode<T: DeserializeOwned>(method: MethodId, params: Value) -> Result<T, CoreError> {
    serde_json::from_value(params).map_err(|e| CoreError::InvalidParameters {
        method,
        message: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use strum::IntoEnumIterator;

    #[test]
    fn null_params_behave_like_empty_object() {
        let cmd = Command::from_method(MethodId::Peek, Value::Null).unwrap();
        assert_eq!(cmd, Command::Peek(PeekParams { limit: None }));
    }

    #[test]
    fn parameterless_methods_ignore_payload() {
        let cmd = Command::from_method(MethodId::Count, json!({ "junk": 1 })).unwrap();
        assert_eq!(cmd, Command::Count);
    }

    #[test]
    fn missing_required_field_is_invalid() {
        let err = Command::from_method(MethodId::CreateCollection, json!({})).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidParameters {
                method: MethodId::CreateCollection,
                ..
            }
        ));
        assert!(err.to_string().starts_with("Invalid parameters for createCollection"));
    }

    #[test]
    fn wrong_type_is_invalid() {
        let err = Command::from_method(MethodId::ListCollections, json!({ "limit": "ten" }));
        assert!(err.is_err());
    }

    #[test]
    fn method_id_matches_decoder() {
        for id in MethodId::iter() {
            let example = crate::registry::get(id).example.clone();
            assert_eq!(Command::from_method(id, example).unwrap().method_id(), id);
        }
    }
}
