// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection
//!
//! Components:
//! - `model` - The opaque detector boundary and its result types
//! - `yolo` - YOLOv8 on ONNX Runtime (CPU)
//! - `preprocessing` - Letterboxing and tensor layout
//! - `labels` - COCO labels and metadata label maps
//! - `adapter` - Normalization into `{label, confidence}` records

pub mod adapter;
pub mod labels;
pub mod model;
pub mod preprocessing;
pub mod yolo;

pub use adapter::{detect, normalize, DetectionRecord};
pub use model::{DetectionError, DetectionModel, LabelMap, PredictedBox, Prediction};
pub use yolo::YoloModel;
