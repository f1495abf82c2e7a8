// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::storage::StagingError;
use crate::vision::DetectionError;

/// JSON body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// No usable `file` part in the upload
    MissingFile,
    InvalidRequest(String),
    PayloadTooLarge(usize),
    /// Writing the upload to the staging directory failed
    StorageFailed(StagingError),
    /// The detection model could not process the staged image
    InferenceFailed(DetectionError),
    /// The inference worker died before returning
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::StorageFailed(_) | ApiError::InferenceFailed(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message; server-side causes stay in the logs
    pub fn public_message(&self) -> String {
        match self {
            ApiError::MissingFile => "no file".to_string(),
            ApiError::InvalidRequest(msg) => msg.clone(),
            ApiError::PayloadTooLarge(limit) => {
                format!("upload exceeds maximum size of {} bytes", limit)
            }
            ApiError::StorageFailed(_) => "failed to store upload".to_string(),
            ApiError::InferenceFailed(_) | ApiError::Internal(_) => "inference failed".to_string(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.public_message(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingFile => write!(f, "Validation error for file: no file"),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::PayloadTooLarge(limit) => {
                write!(f, "Upload exceeds maximum size of {} bytes", limit)
            }
            ApiError::StorageFailed(e) => write!(f, "Storage error: {}", e),
            ApiError::InferenceFailed(e) => write!(f, "Inference error: {}", e),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::StorageFailed(e) => Some(e),
            ApiError::InferenceFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StagingError> for ApiError {
    fn from(err: StagingError) -> Self {
        ApiError::StorageFailed(err)
    }
}

impl From<DetectionError> for ApiError {
    fn from(err: DetectionError) -> Self {
        ApiError::InferenceFailed(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
