// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection endpoint module
//!
//! Provides POST /detect for detecting objects in an uploaded image.

pub mod handler;
pub mod response;
pub mod upload;

pub use handler::detect_handler;
pub use response::DetectResponse;
pub use upload::{read_upload, UploadedImage, FILE_FIELD, MAX_UPLOAD_BYTES};
