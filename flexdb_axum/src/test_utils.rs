//! Request helpers for router tests

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use flexdb::{AppEnv, Database, UserStore};

use crate::{AppState, router};

pub(crate) async fn test_database() -> Database {
    let db = Database::in_memory()
        .await
        .expect("in-memory database should open");
    UserStore::init(&db, &AppEnv::Test)
        .await
        .expect("users table should initialize");
    db
}

/// Router over a fresh, empty in-memory database
pub(crate) async fn test_app() -> (Router, Database) {
    let db = test_database().await;
    let app = router(AppState::new(db.clone(), AppEnv::Test));
    (app, db)
}

pub(crate) async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, body)
}

pub(crate) fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub(crate) fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub(crate) fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}
