// ── Method registry ──
//
// Static catalog of every API method the explorer can invoke: identity,
// category, parameter schema and a ready-to-edit example payload.
// Built once on first access, never mutated afterwards.

use std::sync::LazyLock;

use serde::Serialize;
use serde_json::{Value, json};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

// ── Identity ─────────────────────────────────────────────────────────

/// Closed set of method ids. The string form is the camelCase id used in
/// parameter payloads and on the command line (`listCollections`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum MethodId {
    // Client
    Heartbeat,
    Version,
    Reset,
    ListCollections,
    CountCollections,
    // Collection management
    CreateCollection,
    GetCollection,
    GetOrCreateCollection,
    DeleteCollection,
    // Collection operations
    Add,
    Upsert,
    Get,
    Query,
    Update,
    Delete,
    Peek,
    Count,
    Modify,
}

impl MethodId {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MethodCategory {
    Client,
    CollectionManagement,
    CollectionOperations,
}

impl MethodCategory {
    /// Menu heading.
    pub fn title(self) -> &'static str {
        match self {
            Self::Client => "Client API",
            Self::CollectionManagement => "Collection Management",
            Self::CollectionOperations => "Collection Operations",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Json,
}

// ── Schema ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiParameter {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMethod {
    pub id: MethodId,
    pub name: &'static str,
    pub description: &'static str,
    pub category: MethodCategory,
    pub parameters: Vec<ApiParameter>,
    pub example: Value,
    pub requires_collection: bool,
}

impl ApiMethod {
    /// Whether a successful call can change the set of collections, so a
    /// listing shown to the operator should be re-fetched.
    pub fn refreshes_collections(&self) -> bool {
        matches!(
            self.id,
            MethodId::CreateCollection
                | MethodId::GetOrCreateCollection
                | MethodId::DeleteCollection
                | MethodId::Reset
        )
    }

    /// Destructive methods that wipe server-side data.
    pub fn is_destructive(&self) -> bool {
        matches!(self.id, MethodId::Reset | MethodId::DeleteCollection)
    }

    /// The example payload as 2-space indented JSON.
    pub fn example_json(&self) -> String {
        serde_json::to_string_pretty(&self.example).unwrap_or_else(|_| "{}".into())
    }
}

// ── Lookup ───────────────────────────────────────────────────────────

/// Every method, in menu order.
pub fn all() -> &'static [ApiMethod] {
    &CATALOG
}

/// Look up a method by its string id. Unknown ids yield `None`.
pub fn by_id(id: &str) -> Option<&'static ApiMethod> {
    let id: MethodId = id.parse().ok()?;
    Some(get(id))
}

/// Look up a method by parsed id. Every `MethodId` has a catalog entry.
pub fn get(id: MethodId) -> &'static ApiMethod {
    CATALOG
        .iter()
        .find(|m| m.id == id)
        .unwrap_or_else(|| unreachable!("catalog has an entry for every MethodId"))
}

/// Methods of one category, in declaration order.
pub fn by_category(category: MethodCategory) -> Vec<&'static ApiMethod> {
    CATALOG.iter().filter(|m| m.category == category).collect()
}

/// First catalog entry; the initially selected method.
pub fn first() -> &'static ApiMethod {
    get(MethodId::Heartbeat)
}

// ── Catalog ──────────────────────────────────────────────────────────

fn param(
    name: &'static str,
    param_type: ParamType,
    required: bool,
    description: &'static str,
    example: Value,
) -> ApiParameter {
    ApiParameter {
        name,
        param_type,
        required,
        description,
        default: None,
        example: Some(example),
    }
}

fn method(
    id: MethodId,
    category: MethodCategory,
    description: &'static str,
    parameters: Vec<ApiParameter>,
    example: Value,
) -> ApiMethod {
    ApiMethod {
        id,
        name: id.as_str(),
        description,
        category,
        parameters,
        example,
        requires_collection: category == MethodCategory::CollectionOperations,
    }
}

static CATALOG: LazyLock<Vec<ApiMethod>> = LazyLock::new(|| {
    let mut methods = client_methods();
    methods.extend(collection_management_methods());
    methods.extend(collection_operations_methods());
    methods
});

fn client_methods() -> Vec<ApiMethod> {
    use MethodCategory::Client;
    vec![
        method(
            MethodId::Heartbeat,
            Client,
            "Check that the server is reachable. Returns the current timestamp.",
            vec![],
            json!({}),
        ),
        method(
            MethodId::Version,
            Client,
            "Return the server version.",
            vec![],
            json!({}),
        ),
        method(
            MethodId::Reset,
            Client,
            "Delete every collection and record on the server.",
            vec![],
            json!({}),
        ),
        method(
            MethodId::ListCollections,
            Client,
            "List collections in the current tenant and database.",
            vec![
                param(
                    "limit",
                    ParamType::Number,
                    false,
                    "Maximum number of collections to return",
                    json!(10),
                ),
                param(
                    "offset",
                    ParamType::Number,
                    false,
                    "Number of collections to skip (pagination)",
                    json!(0),
                ),
            ],
            json!({ "limit": 10, "offset": 0 }),
        ),
        method(
            MethodId::CountCollections,
            Client,
            "Return the number of collections.",
            vec![],
            json!({}),
        ),
    ]
}

fn collection_management_methods() -> Vec<ApiMethod> {
    use MethodCategory::CollectionManagement;
    vec![
        method(
            MethodId::CreateCollection,
            CollectionManagement,
            "Create a new collection and select it.",
            vec![
                param(
                    "name",
                    ParamType::String,
                    true,
                    "Collection name (must be unique)",
                    json!("my_collection"),
                ),
                param(
                    "metadata",
                    ParamType::Object,
                    false,
                    "Collection metadata",
                    json!({ "description": "My test collection" }),
                ),
            ],
            json!({
                "name": "my_collection",
                "metadata": { "description": "My test collection" }
            }),
        ),
        method(
            MethodId::GetCollection,
            CollectionManagement,
            "Fetch an existing collection by name and select it.",
            vec![param(
                "name",
                ParamType::String,
                true,
                "Name of the collection to fetch",
                json!("my_collection"),
            )],
            json!({ "name": "my_collection" }),
        ),
        method(
            MethodId::GetOrCreateCollection,
            CollectionManagement,
            "Fetch a collection, creating it if it does not exist, and select it.",
            vec![
                param(
                    "name",
                    ParamType::String,
                    true,
                    "Collection name",
                    json!("my_collection"),
                ),
                param(
                    "metadata",
                    ParamType::Object,
                    false,
                    "Collection metadata (applied on creation only)",
                    json!({ "description": "My collection" }),
                ),
            ],
            json!({
                "name": "my_collection",
                "metadata": { "description": "My collection" }
            }),
        ),
        method(
            MethodId::DeleteCollection,
            CollectionManagement,
            "Delete a collection and all of its records.",
            vec![param(
                "name",
                ParamType::String,
                true,
                "Name of the collection to delete",
                json!("my_collection"),
            )],
            json!({ "name": "my_collection" }),
        ),
    ]
}

#[allow(clippy::too_many_lines)]
fn collection_operations_methods() -> Vec<ApiMethod> {
    use MethodCategory::CollectionOperations;

    let where_filter = |description: &'static str, example: Value| {
        param("where", ParamType::Object, false, description, example)
    };
    let where_document = |description: &'static str, example: Value| {
        param("whereDocument", ParamType::Object, false, description, example)
    };

    vec![
        method(
            MethodId::Add,
            CollectionOperations,
            "Add documents or embeddings to the collection.",
            vec![
                param("ids", ParamType::Array, true, "Unique record ids", json!(["id1", "id2", "id3"])),
                param(
                    "documents",
                    ParamType::Array,
                    false,
                    "Document texts (embeddings are generated server-side)",
                    json!(["Hello world", "Goodbye world", "Test document"]),
                ),
                param(
                    "embeddings",
                    ParamType::Array,
                    false,
                    "Embedding vectors (supplied directly)",
                    json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]),
                ),
                param(
                    "metadatas",
                    ParamType::Array,
                    false,
                    "Per-record metadata",
                    json!([{ "source": "doc1" }, { "source": "doc2" }, { "source": "doc3" }]),
                ),
            ],
            json!({
                "ids": ["id1", "id2", "id3"],
                "documents": ["Hello world", "Goodbye world", "Test document"],
                "metadatas": [{ "source": "doc1" }, { "source": "doc2" }, { "source": "doc3" }]
            }),
        ),
        method(
            MethodId::Upsert,
            CollectionOperations,
            "Add records, or update them if the ids already exist.",
            vec![
                param("ids", ParamType::Array, true, "Unique record ids", json!(["id1", "id2"])),
                param(
                    "documents",
                    ParamType::Array,
                    false,
                    "Document texts",
                    json!(["Updated document 1", "New document 2"]),
                ),
                param(
                    "embeddings",
                    ParamType::Array,
                    false,
                    "Embedding vectors",
                    json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]),
                ),
                param(
                    "metadatas",
                    ParamType::Array,
                    false,
                    "Per-record metadata",
                    json!([{ "updated": true }, { "new": true }]),
                ),
            ],
            json!({
                "ids": ["id1", "id2"],
                "documents": ["Updated document 1", "New document 2"],
                "metadatas": [{ "updated": true }, { "new": true }]
            }),
        ),
        method(
            MethodId::Get,
            CollectionOperations,
            "Fetch records by id or filter.",
            vec![
                param("ids", ParamType::Array, false, "Record ids to fetch", json!(["id1", "id2"])),
                where_filter("Metadata filter", json!({ "source": "doc1" })),
                where_document("Document content filter", json!({ "$contains": "hello" })),
                param("limit", ParamType::Number, false, "Maximum number of records", json!(10)),
                param("offset", ParamType::Number, false, "Number of records to skip", json!(0)),
                param(
                    "include",
                    ParamType::Array,
                    false,
                    "Fields to include (embeddings, documents, metadatas)",
                    json!(["documents", "metadatas"]),
                ),
            ],
            json!({
                "ids": ["id1", "id2"],
                "include": ["documents", "metadatas"]
            }),
        ),
        method(
            MethodId::Query,
            CollectionOperations,
            "Run a similarity search.",
            vec![
                param(
                    "queryTexts",
                    ParamType::Array,
                    false,
                    "Query texts",
                    json!(["What is the meaning of life?"]),
                ),
                param(
                    "queryEmbeddings",
                    ParamType::Array,
                    false,
                    "Query embedding vectors",
                    json!([[1.0, 2.0, 3.0]]),
                ),
                ApiParameter {
                    default: Some(json!(10)),
                    ..param(
                        "nResults",
                        ParamType::Number,
                        false,
                        "Number of results per query",
                        json!(5),
                    )
                },
                where_filter("Metadata filter", json!({ "category": "science" })),
                where_document("Document content filter", json!({ "$contains": "important" })),
                param(
                    "include",
                    ParamType::Array,
                    false,
                    "Fields to include",
                    json!(["documents", "metadatas", "distances"]),
                ),
            ],
            json!({
                "queryTexts": ["What is the meaning of life?"],
                "nResults": 5,
                "include": ["documents", "metadatas", "distances"]
            }),
        ),
        method(
            MethodId::Update,
            CollectionOperations,
            "Update existing records.",
            vec![
                param("ids", ParamType::Array, true, "Record ids to update", json!(["id1"])),
                param(
                    "documents",
                    ParamType::Array,
                    false,
                    "New document texts",
                    json!(["Updated content"]),
                ),
                param(
                    "embeddings",
                    ParamType::Array,
                    false,
                    "New embedding vectors",
                    json!([[1.1, 2.2, 3.3]]),
                ),
                param(
                    "metadatas",
                    ParamType::Array,
                    false,
                    "New metadata",
                    json!([{ "updated_at": "2024-01-01" }]),
                ),
            ],
            json!({
                "ids": ["id1"],
                "documents": ["Updated content"],
                "metadatas": [{ "updated_at": "2024-01-01" }]
            }),
        ),
        method(
            MethodId::Delete,
            CollectionOperations,
            "Delete records by id or filter.",
            vec![
                param("ids", ParamType::Array, false, "Record ids to delete", json!(["id1", "id2"])),
                where_filter("Metadata filter for records to delete", json!({ "status": "deleted" })),
                where_document(
                    "Document content filter for records to delete",
                    json!({ "$contains": "deprecated" }),
                ),
            ],
            json!({ "ids": ["id1", "id2"] }),
        ),
        method(
            MethodId::Peek,
            CollectionOperations,
            "Show a sample of the collection's records.",
            vec![ApiParameter {
                default: Some(json!(10)),
                ..param("limit", ParamType::Number, false, "Number of records to show", json!(5))
            }],
            json!({ "limit": 5 }),
        ),
        method(
            MethodId::Count,
            CollectionOperations,
            "Return the number of records in the collection.",
            vec![],
            json!({}),
        ),
        method(
            MethodId::Modify,
            CollectionOperations,
            "Rename the collection or replace its metadata.",
            vec![
                param(
                    "name",
                    ParamType::String,
                    false,
                    "New collection name",
                    json!("new_collection_name"),
                ),
                param(
                    "metadata",
                    ParamType::Object,
                    false,
                    "New metadata",
                    json!({ "description": "Updated description" }),
                ),
            ],
            json!({ "metadata": { "description": "Updated description" } }),
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::Command;
    use strum::IntoEnumIterator;

    #[test]
    fn every_method_id_has_exactly_one_entry() {
        for id in MethodId::iter() {
            assert_eq!(all().iter().filter(|m| m.id == id).count(), 1, "{id}");
        }
        assert_eq!(all().len(), MethodId::iter().count());
    }

    #[test]
    fn by_id_round_trips() {
        for m in all() {
            assert_eq!(by_id(m.id.as_str()), Some(m));
            assert_eq!(m.name, m.id.to_string());
        }
        assert_eq!(by_id("getOrCreateCollection").map(|m| m.id), Some(MethodId::GetOrCreateCollection));
        assert!(by_id("nope").is_none());
        assert!(by_id("").is_none());
    }

    #[test]
    fn examples_contain_required_parameters() {
        for m in all() {
            for p in m.parameters.iter().filter(|p| p.required) {
                assert!(
                    m.example.get(p.name).is_some(),
                    "{} example is missing {}",
                    m.id,
                    p.name
                );
            }
        }
    }

    #[test]
    fn examples_decode_into_commands() {
        for m in all() {
            let cmd = Command::from_method(m.id, m.example.clone());
            assert!(cmd.is_ok(), "{}: {:?}", m.id, cmd.err());
        }
    }

    #[test]
    fn category_sizes_and_order() {
        let ids = |c| by_category(c).into_iter().map(|m| m.id).collect::<Vec<_>>();
        assert_eq!(
            ids(MethodCategory::Client),
            vec![
                MethodId::Heartbeat,
                MethodId::Version,
                MethodId::Reset,
                MethodId::ListCollections,
                MethodId::CountCollections,
            ]
        );
        assert_eq!(ids(MethodCategory::CollectionManagement).len(), 4);
        assert_eq!(ids(MethodCategory::CollectionOperations).len(), 9);
    }

    #[test]
    fn only_collection_operations_require_a_collection() {
        for m in all() {
            assert_eq!(
                m.requires_collection,
                m.category == MethodCategory::CollectionOperations,
                "{}",
                m.id
            );
        }
    }

    #[test]
    fn first_is_heartbeat() {
        assert_eq!(first().id, MethodId::Heartbeat);
    }

    #[test]
    fn refreshing_methods() {
        let refreshing: Vec<_> = all()
            .iter()
            .filter(|m| m.refreshes_collections())
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(
            refreshing,
            vec!["reset", "createCollection", "getOrCreateCollection", "deleteCollection"]
        );
    }

    #[test]
    fn example_json_uses_two_space_indent() {
        assert_eq!(get(MethodId::Peek).example_json(), "{\n  \"limit\": 5\n}");
    }

    #[test]
    fn example_json_keeps_declaration_order() {
        let text = get(MethodId::Query).example_json();
        let at = |key: &str| text.find(key).unwrap();
        assert!(at("queryTexts") < at("nResults"));
        assert!(at("nResults") < at("include"));
    }

    #[test]
    fn category_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(MethodCategory::CollectionOperations).ok(),
            Some(json!("collection-operations"))
        );
        assert_eq!(MethodCategory::CollectionManagement.to_string(), "collection-management");
    }
}
