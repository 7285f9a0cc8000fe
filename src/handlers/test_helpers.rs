//! Shared test utilities for handler unit tests.
//!
//! Provides a [`TestHarness`] holding a `GestureStore` whose backup lives in
//! a temp directory, plus helpers for building requests and reading JSON
//! response bodies.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot()

use super::router::build_router;
use crate::gesture::{GestureStore, StoreConfig};

/// A self-contained test environment with its own temp storage.
///
/// Holds `TempDir` so the directory isn't cleaned up until the harness drops.
pub struct TestHarness {
    pub store: Arc<GestureStore>,
    _temp_dir: TempDir,
}

impl TestHarness {
    /// Fresh store with the given vector size and an empty backup location.
    pub fn new(vector_size: usize) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let config = StoreConfig::new(vector_size, temp_dir.path().join("backup.json"));
        let store = GestureStore::open(config).expect("failed to open test store");

        Self {
            store: Arc::new(store),
            _temp_dir: temp_dir,
        }
    }

    /// Build the full application router.
    pub fn router(&self) -> Router {
        build_router(self.store.clone())
    }
}

// ---------- Request builders ----------

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json<T: serde::Serialize>(uri: &str, body: &T) -> Request<Body> {
    let json = serde_json::to_string(body).unwrap();
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(json))
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// ---------- Response helpers ----------

/// Send a request through the router and return (status, JSON body).
pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body_bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&body_bytes).to_string())
        })
    };
    (status, json)
}
