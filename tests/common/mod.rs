//! Common test utilities for fieldtrack integration tests.
//!
//! Builds an in-process router over a seeded store and provides a small
//! request helper, so API tests never bind a real socket.

#![allow(dead_code)]

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use fieldtrack::server::{AppState, router};
use fieldtrack::storage::Storage;

/// A router over the demo dataset, writing uploads to the given directory.
pub fn seeded_app_with_uploads(uploads_dir: PathBuf) -> Router {
    let mut storage = Storage::new();
    fieldtrack::seed::seed(&mut storage).unwrap();
    router(AppState::new(storage, uploads_dir))
}

/// A router over the demo dataset.
pub fn seeded_app() -> Router {
    seeded_app_with_uploads(std::env::temp_dir())
}

/// Send one request through the router and decode the JSON response.
///
/// An empty body (e.g. a 204) decodes as `Value::Null`.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
