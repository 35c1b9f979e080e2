// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use graph_harvester::config::{Config, RecordStoreConfig};
use graph_harvester::db::FirestoreDb;
use graph_harvester::models::{AccessCredential, GraphUser, UserRecord};
use graph_harvester::routes::create_router;
use graph_harvester::services::{GraphClient, SignOnService};
use graph_harvester::AppState;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection against the emulator.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    let config = RecordStoreConfig {
        project_id: "test-project".to_string(),
        users_collection: format!("users-{}", uuid::Uuid::new_v4()),
        denied_collection: format!("denied-{}", uuid::Uuid::new_v4()),
    };
    FirestoreDb::new(&config)
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// A pending user record with a credential.
#[allow(dead_code)]
pub fn pending_user(user_id: &str, name: &str) -> UserRecord {
    UserRecord {
        doc_id: None,
        respondent_id: format!("resp-{}", user_id),
        user: Some(GraphUser {
            id: user_id.to_string(),
            name: name.to_string(),
        }),
        token: Some(AccessCredential {
            access_token: format!("token-{}", user_id),
            token_type: Some("bearer".to_string()),
            expires_in: None,
        }),
        permissions: None,
        created_at: "2026-01-01T00:00:00Z".to_string(),
        downloaded: None,
    }
}

/// Link to `edge_path` on the mock server, as the API hands them out.
#[allow(dead_code)]
pub fn link(server: &MockServer, edge_path: &str) -> String {
    format!("{}{}", server.uri(), edge_path)
}

/// Serve `me?metadata=1` for the given token with the listed fields and edges.
#[allow(dead_code)]
pub async fn mount_metadata(
    server: &MockServer,
    token: &str,
    fields: &[&str],
    edges: &[(&str, String)],
) {
    let fields: Vec<_> = fields.iter().map(|name| json!({ "name": name })).collect();
    let connections: serde_json::Map<String, serde_json::Value> = edges
        .iter()
        .map(|(name, url)| (name.to_string(), json!(url)))
        .collect();

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(query_param("metadata", "1"))
        .and(wiremock::matchers::bearer_token(token))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ignored",
            "metadata": { "fields": fields, "connections": connections }
        })))
        .mount(server)
        .await;
}

/// Serve the profile for the given token.
#[allow(dead_code)]
pub async fn mount_profile(server: &MockServer, token: &str, profile: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(query_param("fields", "id,name"))
        .and(wiremock::matchers::bearer_token(token))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile))
        .mount(server)
        .await;
}

/// Serve one collection page at `page_path`.
#[allow(dead_code)]
pub async fn mount_page(
    server: &MockServer,
    page_path: &str,
    data: serde_json::Value,
    next: Option<String>,
) {
    let body = match next {
        Some(next) => json!({ "data": data, "paging": { "next": next } }),
        None => json!({ "data": data, "paging": {} }),
    };

    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Graph client pointed at the mock server.
#[allow(dead_code)]
pub fn test_graph(server: &MockServer) -> GraphClient {
    GraphClient::new(&server.uri())
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_graph("http://127.0.0.1:9")
}

/// Test app whose Graph API calls go to `graph_url`.
#[allow(dead_code)]
pub fn create_test_app_with_graph(graph_url: &str) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::default();
    config.graph.base_url = graph_url.to_string();

    let db = FirestoreDb::new_mock();
    let signon = SignOnService::new(
        GraphClient::new(&config.graph.base_url),
        db,
        config.signon.clone().expect("test config has signon"),
        &config.graph.dialog_url,
    );

    let state = Arc::new(AppState { signon });

    (create_router(state.clone()), state)
}
