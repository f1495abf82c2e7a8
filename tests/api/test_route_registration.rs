// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Route registration tests
//!
//! These tests verify that:
//! - GET / describes the service and its endpoints
//! - GET /healthz always reports ok
//! - /detect only accepts POST
//! - Unknown routes return 404

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use super::helpers::{json_body, setup_app, FailingModel, StubModel};

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let test_app = setup_app(Arc::new(StubModel::new(vec![])));

    let response = test_app.app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"service": "ai-provider", "endpoints": ["/healthz", "/detect"]})
    );
}

#[tokio::test]
async fn test_healthz_ok() {
    let test_app = setup_app(Arc::new(StubModel::new(vec![])));

    let response = test_app.app.oneshot(get("/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_healthz_independent_of_model() {
    // Health does not consult the model, even one that fails every call
    let test_app = setup_app(Arc::new(FailingModel));

    let response = test_app.app.oneshot(get("/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_detect_route_rejects_get() {
    let test_app = setup_app(Arc::new(StubModel::new(vec![])));

    let response = test_app.app.oneshot(get("/detect")).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route_not_found() {
    let test_app = setup_app(Arc::new(StubModel::new(vec![])));

    let response = test_app.app.oneshot(get("/v1/detect")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
