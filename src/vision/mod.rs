// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides object detection on uploaded images via a YOLOv8
//! ONNX model. It runs on CPU only.

pub mod detection;
pub mod image_utils;

pub use detection::{DetectionError, DetectionModel, DetectionRecord, YoloModel};
pub use image_utils::{decode_image_bytes, detect_format, load_image_file, ImageError, ImageInfo};
