// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::response::DetectResponse;
use super::upload::read_upload;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::detection::detect;

/// POST /detect - Detect objects in an uploaded image
///
/// # Request
/// - `multipart/form-data` with the image in the `file` field
///
/// # Response
/// - `detections`: `[{label, confidence}]` in the model's output order
///
/// # Errors
/// - 400 Bad Request: `{"error": "no file"}` when no file was uploaded
/// - 413 Payload Too Large: body exceeds the upload limit
/// - 500 Internal Server Error: staging write or inference failed
pub async fn detect_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    let started = Instant::now();

    // 1. Extract the upload
    let upload = read_upload(multipart).await.map_err(|e| {
        warn!("Detect request rejected: {}", e);
        e
    })?;

    // 2. Persist to the staging directory
    let staged = state
        .staging
        .stage(&upload.file_name, &upload.bytes)
        .await
        .map_err(|e| {
            error!("Failed to stage upload: {}", e);
            ApiError::from(e)
        })?;
    drop(upload);

    debug!("Running {} on {}", state.model.name(), staged.path.display());

    // 3. Run inference off the async runtime
    let model = state.model.clone();
    let path = staged.path.clone();
    let detections = tokio::task::spawn_blocking(move || detect(model.as_ref(), &path))
        .await
        .map_err(|e| {
            error!("Inference task failed for {}: {}", staged.path.display(), e);
            ApiError::Internal(e.to_string())
        })?
        .map_err(|e| {
            error!("Inference failed for {}: {}", staged.path.display(), e);
            ApiError::from(e)
        })?;

    info!(
        "Detect complete: {} objects in {} ({}ms) [{}]",
        detections.len(),
        staged.file_name,
        started.elapsed().as_millis(),
        detections
            .iter()
            .map(|d| format!("{}:{:.2}", d.label, d.confidence))
            .collect::<Vec<_>>()
            .join(", ")
    );

    // 4. Shape the response
    Ok(Json(DetectResponse::new(detections)))
}
