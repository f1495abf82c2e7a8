// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection model boundary
//!
//! A detector is treated as an opaque function from an image path to a
//! [`Prediction`]: the model's own label map plus the boxes it kept, in the
//! order it produced them. Everything downstream works on these fixed types.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::vision::image_utils::ImageError;

/// Class index to human-readable label, as shipped with the model
pub type LabelMap = BTreeMap<usize, String>;

/// Errors raised by a detection model or while normalizing its output
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Detection model not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to load detection model: {0}")]
    ModelLoad(String),

    #[error("Failed to read image: {0}")]
    Image(#[from] ImageError),

    #[error("Model inference failed: {0}")]
    ModelFailure(String),

    #[error("Model reported class index {0} missing from its label map")]
    UnknownClass(usize),
}

/// One box as reported by the model
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedBox {
    /// Index into the model's label map
    pub class_index: usize,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// [x_min, y_min, x_max, y_max] in original image pixels
    pub xyxy: [f32; 4],
}

/// Raw result of running the model on a single image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prediction {
    pub names: LabelMap,
    pub boxes: Vec<PredictedBox>,
}

/// A loaded, read-only object detector
///
/// Implementations are shared across requests behind an `Arc` and must be
/// safe to call from several blocking worker threads at once.
pub trait DetectionModel: Send + Sync {
    /// Short model identifier for logs
    fn name(&self) -> &str;

    /// Run detection on the image stored at `image_path`
    fn predict(&self, image_path: &Path) -> Result<Prediction, DetectionError>;
}
