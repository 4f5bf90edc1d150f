//! Shared helpers for integration tests: a fresh in-memory store per test and
//! request helpers that drive the router through `tower::ServiceExt`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use axum::Router;
use tower::ServiceExt;

use tcgindex::{apply_migrations, build_app, create_pool, resolve_registry, AppState, ResourceEngine};

pub const TEST_BODY_LIMIT: usize = 64 * 1024;

/// Engine over a private `sqlite::memory:` database with every table created.
///
/// The pool holds a single connection so all requests of one test see the
/// same database.
pub async fn test_engine() -> ResourceEngine {
    let model = resolve_registry().unwrap();
    let pool = create_pool("sqlite::memory:", 1).await.unwrap();
    apply_migrations(&pool, &model).await.unwrap();
    ResourceEngine::new(pool, Arc::new(model))
}

/// Engine over a fresh database file with `max_connections` connections, as
/// the server runs it. Keep the returned directory alive for the test.
pub async fn test_file_engine(max_connections: u32) -> (tempfile::TempDir, ResourceEngine) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("tcgindex.db").display());
    let model = resolve_registry().unwrap();
    let pool = create_pool(&url, max_connections).await.unwrap();
    apply_migrations(&pool, &model).await.unwrap();
    (dir, ResourceEngine::new(pool, Arc::new(model)))
}

/// The full router, with the same layers the server uses.
pub fn build_test_app(engine: ResourceEngine) -> Router {
    build_test_app_with_limit(engine, TEST_BODY_LIMIT)
}

pub fn build_test_app_with_limit(engine: ResourceEngine, body_limit: usize) -> Router {
    build_app(AppState { engine }, body_limit)
}

pub async fn test_app() -> Router {
    build_test_app(test_engine().await)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<String>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(b) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(b)
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body.to_string())).await
}

pub async fn patch_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body.to_string())).await
}

pub async fn put_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body.to_string())).await
}

/// POST a raw, possibly malformed, body.
pub async fn post_raw(app: &Router, uri: &str, body: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(body.to_string())).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST and return the created row's id, asserting 201.
pub async fn create_id(app: &Router, uri: &str, body: serde_json::Value) -> i64 {
    let response = post_json(app, uri, body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED, "POST {uri}");
    body_json(response).await["id"].as_i64().unwrap()
}
