// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction for POST /detect

use axum::{body::Bytes, http::StatusCode};
use axum_extra::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use tracing::debug;

use crate::api::errors::ApiError;

/// Form field carrying the image
pub const FILE_FIELD: &str = "file";

/// Maximum accepted request body (25MB)
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// An image received from the client, not yet written anywhere
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Client-supplied filename (untrusted)
    pub file_name: String,
    pub bytes: Bytes,
}

/// Pull the first usable `file` part out of a multipart body.
///
/// A request that is not multipart, has no `file` part, or whose `file` part
/// carries no filename is treated as having no file. Other fields are ignored.
pub async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedImage, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!("Request body is not multipart: {}", rejection);
        ApiError::MissingFile
    })?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let Some(file_name) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
        else {
            debug!("Ignoring '{}' part without a filename", FILE_FIELD);
            continue;
        };

        let bytes = field.bytes().await.map_err(multipart_error)?;
        debug!("Received upload {:?} ({} bytes)", file_name, bytes.len());

        return Ok(UploadedImage { file_name, bytes });
    }

    Err(ApiError::MissingFile)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(MAX_UPLOAD_BYTES)
    } else {
        ApiError::InvalidRequest(err.body_text())
    }
}
