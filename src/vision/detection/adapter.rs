// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Normalizes raw model output into `{label, confidence}` records

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::model::{DetectionError, DetectionModel, Prediction};

/// One detected object as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// Human-readable class label from the model's label map
    pub label: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
}

/// Run `model` on a staged image and normalize its output
///
/// Records keep the model's output order. No thresholding, deduplication or
/// re-sorting happens here.
pub fn detect(
    model: &dyn DetectionModel,
    image_path: &Path,
) -> Result<Vec<DetectionRecord>, DetectionError> {
    let prediction = model.predict(image_path)?;
    let records = normalize(&prediction)?;
    debug!(
        "{} returned {} boxes for {}",
        model.name(),
        records.len(),
        image_path.display()
    );
    Ok(records)
}

/// Resolve each box's class index through the prediction's label map
pub fn normalize(prediction: &Prediction) -> Result<Vec<DetectionRecord>, DetectionError> {
    prediction
        .boxes
        .iter()
        .map(|b| {
            let label = prediction
                .names
                .get(&b.class_index)
                .ok_or(DetectionError::UnknownClass(b.class_index))?;
            Ok(DetectionRecord {
                label: label.clone(),
                confidence: f64::from(b.confidence),
            })
        })
        .collect()
}
