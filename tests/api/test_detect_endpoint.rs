// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /detect endpoint tests
//!
//! These tests verify that the detect handler:
//! - Stages the uploaded file and hands its path to the model
//! - Returns one `{label, confidence}` record per model box, in model order
//! - Returns 400 `{"error": "no file"}` whenever no file was uploaded
//! - Keeps staged files inside the staging directory
//! - Maps storage and inference failures to 500 without leaking details
//! - Rejects bodies over the upload limit with 413

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use super::helpers::{
    detect_request, gray_png, json_body, setup_app, FailingModel, PanickingModel, Part,
    StubModel,
};
use ai_provider::api::detect::MAX_UPLOAD_BYTES;

#[tokio::test]
async fn test_detect_returns_records_in_model_order() {
    let model = Arc::new(StubModel::new(vec![(16, 0.91), (0, 0.42), (16, 0.30)]));
    let test_app = setup_app(model.clone());
    let png = gray_png();

    let response = test_app
        .app
        .oneshot(detect_request(&[Part {
            name: "file",
            filename: Some("dog.png"),
            content: &png,
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    let detections = body["detections"].as_array().unwrap();
    assert_eq!(detections.len(), 3);
    let labels: Vec<_> = detections
        .iter()
        .map(|d| d["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["dog", "person", "dog"]);
    for d in detections {
        let confidence = d["confidence"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&confidence));
    }
    assert!((detections[0]["confidence"].as_f64().unwrap() - 0.91).abs() < 1e-6);
}

#[tokio::test]
async fn test_detect_with_no_objects_is_success() {
    let model = Arc::new(StubModel::new(vec![]));
    let test_app = setup_app(model);
    let png = gray_png();

    let response = test_app
        .app
        .oneshot(detect_request(&[Part {
            name: "file",
            filename: Some("gray.png"),
            content: &png,
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"detections": []}));
}

#[tokio::test]
async fn test_detect_stages_upload_before_inference() {
    let model = Arc::new(StubModel::new(vec![(2, 0.8)]));
    let test_app = setup_app(model.clone());
    let staging_root = test_app.staging_root.clone();

    let response = test_app
        .app
        .oneshot(detect_request(&[Part {
            name: "file",
            filename: Some("street scene.jpg"),
            content: b"jpeg bytes",
        }]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let calls = model.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (path, bytes) = &calls[0];
    assert_eq!(path, &staging_root.join("street_scene.jpg"));
    assert_eq!(bytes.as_slice(), b"jpeg bytes");
    // Staged files are kept after the request
    assert!(path.is_file());
}

#[tokio::test]
async fn test_detect_traversal_filename_stays_in_staging_dir() {
    let model = Arc::new(StubModel::new(vec![]));
    let test_app = setup_app(model.clone());
    let staging_root = test_app.staging_root.clone();

    let response = test_app
        .app
        .oneshot(detect_request(&[Part {
            name: "file",
            filename: Some("../../../tmp/escape.png"),
            content: b"data",
        }]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let paths = model.seen_paths();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].parent().unwrap(), staging_root.as_path());
    assert_eq!(paths[0].file_name().unwrap(), "tmp_escape.png");
}

#[tokio::test]
async fn test_detect_unusable_filename_gets_generated_name() {
    let model = Arc::new(StubModel::new(vec![(53, 0.7)]));
    let test_app = setup_app(model.clone());
    let staging_root = test_app.staging_root.clone();

    let response = test_app
        .app
        .oneshot(detect_request(&[Part {
            name: "file",
            filename: Some("../.."),
            content: b"data",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["detections"][0]["label"], "pizza");

    let paths = model.seen_paths();
    let name = paths[0].file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("upload_"), "unexpected name {}", name);
    assert_eq!(name.len(), "upload_".len() + 32);
    assert_eq!(paths[0].parent().unwrap(), staging_root.as_path());
}

#[tokio::test]
async fn test_detect_missing_file_field() {
    let model = Arc::new(StubModel::new(vec![(0, 0.9)]));
    let test_app = setup_app(model.clone());

    let response = test_app
        .app
        .oneshot(detect_request(&[
            Part {
                name: "image",
                filename: Some("dog.png"),
                content: b"data",
            },
            Part {
                name: "note",
                filename: None,
                content: b"hello",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "no file"}));
    assert!(model.seen_paths().is_empty());
}

#[tokio::test]
async fn test_detect_empty_form() {
    let test_app = setup_app(Arc::new(StubModel::new(vec![])));

    let response = test_app.app.oneshot(detect_request(&[])).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "no file"}));
}

#[tokio::test]
async fn test_detect_file_field_without_filename() {
    let test_app = setup_app(Arc::new(StubModel::new(vec![])));

    let response = test_app
        .app
        .oneshot(detect_request(&[Part {
            name: "file",
            filename: Some(""),
            content: b"data",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "no file"}));
}

#[tokio::test]
async fn test_detect_non_multipart_body() {
    let test_app = setup_app(Arc::new(StubModel::new(vec![])));

    let request = Request::builder()
        .method("POST")
        .uri("/detect")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"file": "dog.png"}"#))
        .unwrap();
    let response = test_app.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "no file"}));
}

#[tokio::test]
async fn test_detect_inference_failure_is_500() {
    let test_app = setup_app(Arc::new(FailingModel));

    let response = test_app
        .app
        .oneshot(detect_request(&[Part {
            name: "file",
            filename: Some("broken.png"),
            content: b"not an image",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body, json!({"error": "inference failed"}));
}

#[tokio::test]
async fn test_detect_storage_failure_is_500() {
    let model = Arc::new(StubModel::new(vec![]));
    let test_app = setup_app(model.clone());
    // Occupy the staging path with a regular file so the directory cannot exist
    std::fs::write(&test_app.staging_root, b"").unwrap();

    let response = test_app
        .app
        .oneshot(detect_request(&[Part {
            name: "file",
            filename: Some("dog.png"),
            content: b"data",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"error": "failed to store upload"})
    );
    assert!(model.seen_paths().is_empty());
}

#[tokio::test]
async fn test_detect_unknown_class_is_500() {
    // Class 99 is not in the stub label map
    let test_app = setup_app(Arc::new(StubModel::new(vec![(99, 0.5)])));

    let response = test_app
        .app
        .oneshot(detect_request(&[Part {
            name: "file",
            filename: Some("dog.png"),
            content: b"data",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_detect_panicking_model_is_500() {
    let test_app = setup_app(Arc::new(PanickingModel));

    let response = test_app
        .app
        .clone()
        .oneshot(detect_request(&[Part {
            name: "file",
            filename: Some("dog.png"),
            content: b"data",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({"error": "inference failed"}));

    // The server keeps serving after the crashed task
    let health = Request::builder()
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();
    let response = test_app.app.oneshot(health).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_detect_oversize_body_is_413() {
    let model = Arc::new(StubModel::new(vec![(0, 0.9)]));
    let test_app = setup_app(model.clone());
    let oversize = vec![0u8; MAX_UPLOAD_BYTES + 1024 * 1024];

    let response = test_app
        .app
        .oneshot(detect_request(&[Part {
            name: "file",
            filename: Some("huge.png"),
            content: &oversize,
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    assert!(model.seen_paths().is_empty());
}
