//! 集成测试公共工具

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use fulfillment_server::db::Database;
use fulfillment_server::{AppState, api};
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

/// Migrated temp database; keep the `TempDir` alive for the test
pub async fn test_state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::at_path(dir.path().join("fulfillment.db"));
    db.migrate().await.unwrap();
    (dir, AppState::with_database(db))
}

pub async fn exec(db: &Database, sql: &str) {
    let mut conn = db.connect().await.unwrap();
    sqlx::query(sql).execute(&mut conn).await.unwrap();
}

pub async fn count(db: &Database, sql: &str) -> i64 {
    let mut conn = db.connect().await.unwrap();
    sqlx::query_scalar(sql).fetch_one(&mut conn).await.unwrap()
}

/// Dialogflow-style body with one output context for `session`
pub fn webhook_body(intent: &str, parameters: Value, session: &str) -> Value {
    json!({
        "responseId": "test-response",
        "queryResult": {
            "queryText": "test",
            "parameters": parameters,
            "intent": {"displayName": intent},
            "outputContexts": [{
                "name": format!("projects/test-agent/agent/sessions/{session}/contexts/ongoing-order"),
                "lifespanCount": 5
            }]
        }
    })
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Send one webhook call and return its fulfillment text
pub async fn say(app: &Router, intent: &str, parameters: Value, session: &str) -> String {
    let (status, body) = post_json(app, "/", &webhook_body(intent, parameters, session)).await;
    assert_eq!(status, StatusCode::OK);
    body["fulfillmentText"].as_str().unwrap().to_string()
}

pub fn router(state: &AppState) -> Router {
    api::create_router(state.clone())
}
