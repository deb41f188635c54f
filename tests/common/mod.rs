//! Shared helpers for router-level tests.
//!
//! Each integration test file is compiled as its own crate, so helpers used
//! by only one of them would otherwise warn as dead code.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use catalog_backend::config::PagingConfig;
use catalog_backend::repositories::InMemoryProductRepository;
use catalog_backend::state::AppState;

/// Router over a fresh in-memory store, plus the store itself so tests can
/// plant references.
pub fn test_app() -> (Router, InMemoryProductRepository) {
    test_app_with(PagingConfig::default(), "")
}

pub fn test_app_with(paging: PagingConfig, base_path: &str) -> (Router, InMemoryProductRepository) {
    let repository = InMemoryProductRepository::new();
    let state = AppState::new(Arc::new(repository.clone()), paging);
    (catalog_backend::app(state, base_path), repository)
}

pub fn chair() -> Value {
    json!({
        "name": "Chair",
        "description": "Solid wood chair",
        "price": 99.90,
        "imgUrl": "http://x/c.png"
    })
}

pub fn product_named(name: &str, price: f64) -> Value {
    json!({
        "name": name,
        "description": format!("{name} for the living room"),
        "price": price,
        "imgUrl": format!("http://x/{name}.png")
    })
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

/// POSTs `body` and returns the assigned id.
pub async fn create(app: &Router, body: Value) -> i64 {
    let response = send(app, "POST", "/products", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}
