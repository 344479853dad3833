#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` session behavior using wiremock.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use uuid::Uuid;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chromaplay_core::{
    ApiClient, ClientOptions, ConnectionUpdate, FailureKind, QueryParams, RecordsParams, registry,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let options = ClientOptions::new(Url::parse(&server.uri()).unwrap());
    let client = ApiClient::with_http(options, reqwest::Client::new()).unwrap();
    (server, client)
}

async fn mount_heartbeat(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v2/heartbeat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "nanosecond heartbeat": 1 })),
        )
        .mount(server)
        .await;
}

fn collections_path(tenant: &str, database: &str) -> String {
    format!("/api/v2/tenants/{tenant}/databases/{database}/collections")
}

/// Mount create (POST) for `name` and return the id the server hands out.
async fn mount_create(server: &MockServer, tenant: &str, database: &str, name: &str) -> String {
    let id = Uuid::new_v4().to_string();
    Mock::given(method("POST"))
        .and(path(collections_path(tenant, database)))
        .and(body_partial_json(json!({ "name": name })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": id, "name": name })),
        )
        .mount(server)
        .await;
    id
}

async fn connected_with_collection(name: &str) -> (MockServer, ApiClient, String) {
    let (server, client) = setup().await;
    mount_heartbeat(&server).await;
    let id = mount_create(&server, "default_tenant", "default_database", name).await;

    assert!(client.connect(ConnectionUpdate::new()).await.success);
    assert!(client.create_collection(name, None).await.success);
    (server, client, id)
}

// ── Connection lifecycle ────────────────────────────────────────────

#[tokio::test]
async fn connect_then_disconnect_clears_context() {
    let (server, client) = setup().await;
    mount_heartbeat(&server).await;
    mount_create(&server, "t", "d", "foo").await;

    let result = client
        .connect(ConnectionUpdate::new().tenant("t").database("d"))
        .await;
    assert!(result.success);
    assert_eq!(result.data, Some(true));
    assert!(client.create_collection("foo", None).await.success);
    assert_eq!(client.current_collection_name().as_deref(), Some("foo"));

    client.disconnect();

    assert!(!client.is_connected());
    assert_eq!(client.current_collection_name(), None);
}

#[tokio::test]
async fn empty_heartbeat_body_still_connects() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/heartbeat"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = client.connect(ConnectionUpdate::new()).await;
    assert!(result.success, "{:?}", result.error);
    assert!(client.is_connected());

    let probe = client.execute_method("heartbeat", Value::Null).await;
    assert!(probe.success);
    assert_eq!(probe.data, None);
}

#[tokio::test]
async fn connectivity_listener_sees_connect_and_disconnect() {
    let (server, client) = setup().await;
    mount_heartbeat(&server).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let _sub = client.on_connection_change(move |c| s.lock().unwrap().push(*c));

    client.connect(ConnectionUpdate::new()).await;
    client.disconnect();

    assert_eq!(*seen.lock().unwrap(), vec![true, false]);
}

#[tokio::test]
async fn failed_connect_keeps_config_and_reports_reason() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/heartbeat"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Unauthorized" })))
        .mount(&server)
        .await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let _sub = client.on_connection_change(move |c| s.lock().unwrap().push(*c));

    let result = client
        .connect(ConnectionUpdate::new().tenant("acme"))
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Unauthorized"));
    assert!(!client.is_connected());
    assert_eq!(client.config().tenant(), "acme");
    // Never connected, so connectivity did not change.
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_reconnect_drops_collection_and_notifies() {
    let (server, client, _) = connected_with_collection("foo").await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let _sub = client.on_connection_change(move |c| s.lock().unwrap().push(*c));

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/heartbeat"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client.connect(ConnectionUpdate::new()).await;
    assert_eq!(result.error.as_deref(), Some("HTTP 503"));
    assert!(!client.is_connected());
    assert_eq!(client.current_collection_name(), None);
    assert_eq!(*seen.lock().unwrap(), vec![false]);
}

#[tokio::test]
async fn reconnect_to_other_tenant_clears_collection() {
    let (_server, client, _) = connected_with_collection("foo").await;

    assert!(client.connect(ConnectionUpdate::new()).await.success);
    assert_eq!(client.current_collection_name().as_deref(), Some("foo"));

    assert!(
        client
            .connect(ConnectionUpdate::new().tenant("other"))
            .await
            .success
    );
    assert_eq!(client.current_collection_name(), None);
}

#[tokio::test]
async fn bearer_token_is_attached_after_connect() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/heartbeat"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "nanosecond heartbeat": 1 })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/version"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("1.0.0")))
        .expect(1)
        .mount(&server)
        .await;

    let update = ConnectionUpdate::new().auth_token(SecretString::from("s3cret"));
    assert!(client.connect(update).await.success);
    assert_eq!(client.version().await.data.as_deref(), Some("1.0.0"));
}

// ── Collection context ──────────────────────────────────────────────

#[tokio::test]
async fn scoped_methods_without_collection_send_nothing() {
    let (server, client) = setup().await;
    mount_heartbeat(&server).await;
    client.connect(ConnectionUpdate::new()).await;
    let before = server.received_requests().await.unwrap().len();

    for m in registry::all().iter().filter(|m| m.requires_collection) {
        let result = client
            .execute_method(m.id.as_str(), m.example.clone())
            .await;
        assert!(!result.success, "{} should fail", m.id);
        assert_eq!(
            result.error.as_deref(),
            Some("No collection selected. Please select or create a collection first.")
        );
        assert_eq!(result.failure, Some(FailureKind::NoCollection));
    }

    assert_eq!(server.received_requests().await.unwrap().len(), before);
}

#[tokio::test]
async fn create_then_count_targets_new_collection() {
    let (server, client, id) = connected_with_collection("foo").await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v2/collections/{id}/count")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(7)))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.count().await;
    assert!(result.success);
    assert_eq!(result.data, Some(7));
}

#[tokio::test]
async fn create_sends_empty_metadata_and_no_get_or_create() {
    let (server, client) = setup().await;
    mount_heartbeat(&server).await;

    Mock::given(method("POST"))
        .and(path(collections_path("default_tenant", "default_database")))
        .and(body_json(json!({ "name": "foo", "metadata": {}, "get_or_create": false })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "c1", "name": "foo" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.connect(ConnectionUpdate::new()).await;
    let result = client
        .execute_method("createCollection", json!({ "name": "foo" }))
        .await;
    assert!(result.success);
    assert_eq!(result.data.unwrap()["id"], "c1");
}

#[tokio::test]
async fn deleting_current_collection_clears_context() {
    let (server, client, _) = connected_with_collection("foo").await;

    Mock::given(method("DELETE"))
        .and(path(format!(
            "{}/foo",
            collections_path("default_tenant", "default_database")
        )))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = client.delete_collection("foo").await;
    assert!(result.success);
    assert_eq!(client.current_collection_name(), None);
}

#[tokio::test]
async fn deleting_other_collection_keeps_context() {
    let (server, client, _) = connected_with_collection("foo").await;

    Mock::given(method("DELETE"))
        .and(path(format!(
            "{}/bar",
            collections_path("default_tenant", "default_database")
        )))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(client.delete_collection("bar").await.success);
    assert_eq!(client.current_collection_name().as_deref(), Some("foo"));
}

#[tokio::test]
async fn get_or_create_sends_flag_and_get_reflects_server() {
    let (server, client) = setup().await;
    mount_heartbeat(&server).await;
    let base = collections_path("default_tenant", "default_database");

    Mock::given(method("POST"))
        .and(path(base.clone()))
        .and(body_partial_json(json!({ "name": "bar", "get_or_create": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "c2", "name": "bar", "metadata": { "v": 1 }
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{base}/bar")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "c2", "name": "bar", "metadata": { "v": 1 }
        })))
        .mount(&server)
        .await;

    client.connect(ConnectionUpdate::new()).await;
    let mut first = serde_json::Map::new();
    first.insert("v".into(), json!(1));
    let mut second = serde_json::Map::new();
    second.insert("v".into(), json!(2));

    assert!(client.get_or_create_collection("bar", Some(first)).await.success);
    assert!(client.get_or_create_collection("bar", Some(second)).await.success);

    let fetched = client.get_collection("bar").await.data.unwrap();
    assert_eq!(fetched.metadata.unwrap()["v"], json!(1));
    assert_eq!(client.current_collection_id().as_deref(), Some("c2"));
}

#[tokio::test]
async fn reset_clears_context() {
    let (server, client, _) = connected_with_collection("foo").await;

    Mock::given(method("POST"))
        .and(path("/api/v2/reset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .mount(&server)
        .await;

    assert!(client.reset().await.success);
    assert_eq!(client.current_collection_name(), None);
}

#[tokio::test]
async fn modify_updates_cached_collection() {
    let (server, client, id) = connected_with_collection("foo").await;

    Mock::given(method("PUT"))
        .and(path(format!("/api/v2/collections/{id}")))
        .and(body_json(json!({ "new_name": "renamed", "new_metadata": { "k": "v" } })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .execute_method("modify", json!({ "name": "renamed", "metadata": { "k": "v" } }))
        .await;
    assert!(result.success);

    let current = client.current_collection().unwrap();
    assert_eq!(current.name, "renamed");
    assert_eq!(current.metadata.unwrap()["k"], "v");
}

// ── Record operations ───────────────────────────────────────────────

#[tokio::test]
async fn query_defaults_n_results_and_include() {
    let (server, client, id) = connected_with_collection("foo").await;

    Mock::given(method("POST"))
        .and(path(format!("/api/v2/collections/{id}/query")))
        .and(body_json(json!({
            "query_texts": ["hi"],
            "n_results": 10,
            "include": ["documents", "metadatas", "distances"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ids": [["a"]] })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .query(QueryParams {
            query_texts: Some(vec!["hi".into()]),
            ..QueryParams::default()
        })
        .await;
    assert!(result.success, "{:?}", result.error);
}

#[tokio::test]
async fn get_defaults_include_and_empty_count_is_absent() {
    let (server, client, id) = connected_with_collection("foo").await;

    Mock::given(method("POST"))
        .and(path(format!("/api/v2/collections/{id}/get")))
        .and(body_json(json!({ "ids": ["a"], "include": ["documents", "metadatas"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ids": ["a"] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/collections/{id}/count")))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let got = client.execute_method("get", json!({ "ids": ["a"] })).await;
    assert!(got.success, "{:?}", got.error);

    let count = client.count().await;
    assert!(count.success, "{:?}", count.error);
    assert_eq!(count.data, None);
}

#[tokio::test]
async fn peek_uses_get_endpoint_with_limit() {
    let (server, client, id) = connected_with_collection("foo").await;

    Mock::given(method("POST"))
        .and(path(format!("/api/v2/collections/{id}/get")))
        .and(body_json(json!({ "limit": 10, "include": ["documents", "metadatas"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ids": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.execute_method("peek", Value::Null).await;
    assert!(result.success, "{:?}", result.error);
}

#[tokio::test]
async fn add_returns_true_on_empty_body() {
    let (server, client, id) = connected_with_collection("foo").await;

    Mock::given(method("POST"))
        .and(path(format!("/api/v2/collections/{id}/add")))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let result = client
        .add(RecordsParams {
            ids: vec!["a".into()],
            documents: Some(vec!["hello".into()]),
            ..RecordsParams::default()
        })
        .await;
    assert_eq!(result.data, Some(true));
}

// ── Dispatch failures ───────────────────────────────────────────────

#[tokio::test]
async fn unknown_method_fails_with_zero_duration() {
    let (server, client) = setup().await;

    let result = client.execute_method("frobnicate", json!({})).await;

    assert!(!result.success);
    assert_eq!(result.duration, 0);
    assert_eq!(result.error.as_deref(), Some("Unknown method: frobnicate"));
    assert_eq!(result.failure, Some(FailureKind::UnknownMethod));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_parameters_fail_without_request() {
    let (server, client) = setup().await;
    mount_heartbeat(&server).await;
    client.connect(ConnectionUpdate::new()).await;
    let before = server.received_requests().await.unwrap().len();

    let result = client
        .execute_method("getCollection", json!({ "name": 42 }))
        .await;

    assert!(!result.success);
    assert_eq!(result.duration, 0);
    assert!(
        result
            .error
            .unwrap()
            .starts_with("Invalid parameters for getCollection")
    );
    assert_eq!(server.received_requests().await.unwrap().len(), before);
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let (server, client) = setup().await;
    mount_heartbeat(&server).await;

    Mock::given(method("GET"))
        .and(path(format!(
            "{}/missing",
            collections_path("default_tenant", "default_database")
        )))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "NotFoundError",
            "message": "Collection [missing] does not exist"
        })))
        .mount(&server)
        .await;

    client.connect(ConnectionUpdate::new()).await;
    let result = client.get_collection("missing").await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Collection [missing] does not exist")
    );
    assert_eq!(client.current_collection_name(), None);
}

#[tokio::test]
async fn unreachable_server_reports_connection_failure() {
    let options = ClientOptions::new(Url::parse("http://127.0.0.1:9").unwrap());
    let client = ApiClient::new(options).unwrap();

    let result = client.connect(ConnectionUpdate::new()).await;

    assert!(!result.success);
    assert!(
        result
            .error
            .unwrap()
            .starts_with("Cannot connect to http://127.0.0.1:9")
    );
}
