#![allow(dead_code)]
/// Common test utilities for signpost integration tests
///
/// This file contains the shared application setup and request helpers used
/// by every integration test. Each test builds a fresh router over freshly
/// seeded stores, so tests never see each other's writes.

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use signpost::{
    config::{base_config, ConfigUpdate, ValidationErrorFormat},
    create_app, AppState,
};
use tower::ServiceExt;

/// Creates a test application with the default configuration and seeded stores
pub fn create_test_app() -> Router {
    create_app(AppState::seeded(), &base_config()).unwrap()
}

/// Creates a test application that renders validation failures as plain text
pub fn create_plain_text_app() -> Router {
    let config = base_config().apply_update(ConfigUpdate {
        validation_errors: Some(ValidationErrorFormat::PlainText),
        ..ConfigUpdate::default()
    });
    create_app(AppState::seeded(), &config).unwrap()
}

/// Sends a request with an optional JSON body and returns the raw response parts
///
/// ### Returns
///
/// The status, the content type (if any) and the body as text
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: impl Into<Body>,
) -> (StatusCode, Option<String>, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    let request = builder.body(body.into()).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

/// Sends a request and parses the response body as JSON
pub async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, text) = match body {
        Some(body) => send_raw(app, method, uri, Some("application/json"), body.to_string()).await,
        None => send_raw(app, method, uri, None, Body::empty()).await,
    };
    let json = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap()
    };
    (status, json)
}

/// GET request returning status and JSON body
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    send_json(app, Method::GET, uri, None).await
}

/// The `loc` of every entry in a 422 response, dot-joined
pub fn error_locations(body: &Value) -> Vec<String> {
    body["detail"]
        .as_array()
        .map(|detail| {
            detail
                .iter()
                .map(|entry| {
                    entry["loc"]
                        .as_array()
                        .unwrap()
                        .iter()
                        .map(|segment| match segment {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(".")
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Keys of a JSON object, sorted
pub fn keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}
