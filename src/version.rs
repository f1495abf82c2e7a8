// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the AI provider

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Supported features in this version
pub const FEATURES: &[&str] = &["object-detection", "yolov8-onnx", "multipart-upload"];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("AI Provider {} ({})", VERSION_NUMBER, FEATURES.join(", "))
}
