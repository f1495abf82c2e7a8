// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection response types

use serde::{Deserialize, Serialize};

use crate::vision::DetectionRecord;

/// Response from object detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectResponse {
    /// Detected objects in the model's output order
    pub detections: Vec<DetectionRecord>,
}

impl DetectResponse {
    pub fn new(detections: Vec<DetectionRecord>) -> Self {
        Self { detections }
    }
}
