// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 object detector on ONNX Runtime
//!
//! Loads an exported YOLOv8 ONNX graph and runs it on CPU. The graph emits a
//! single `[1, 4 + C, N]` tensor: `N` candidate boxes in centre/size form
//! followed by `C` per-class scores. Candidates are filtered by confidence
//! and reduced with class-wise NMS here, which is the part of the model's
//! behaviour that does not live inside the graph itself.

use anyhow::{Context, Result};
use ndarray::{ArrayView2, Axis, Ix3};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use super::labels::{coco_label_map, parse_names_metadata};
use super::model::{DetectionError, DetectionModel, LabelMap, PredictedBox, Prediction};
use super::preprocessing::{preprocess_for_yolo, LetterboxInfo, YOLO_INPUT_SIZE};
use crate::vision::image_utils::load_image_file;

/// Minimum class score for a candidate to be kept
pub const CONFIDENCE_THRESHOLD: f32 = 0.25;

/// IoU above which a lower-scored box of the same class is suppressed
pub const IOU_THRESHOLD: f32 = 0.45;

/// Upper bound on boxes returned per image
pub const MAX_DETECTIONS: usize = 300;

/// Metadata key under which exported models carry their label map
const NAMES_METADATA_KEY: &str = "names";

/// A candidate box in model input space
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub class_index: usize,
    pub confidence: f32,
    pub xyxy: [f32; 4],
}

/// YOLOv8 detector backed by an ONNX Runtime session
pub struct YoloModel {
    /// ONNX Runtime session (run requires exclusive access)
    session: Mutex<Session>,
    /// Model input name
    input_name: String,
    /// Label map from model metadata, or COCO-80
    names: LabelMap,
    /// Model identifier (file stem)
    model_name: String,
    input_size: u32,
}

impl std::fmt::Debug for YoloModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloModel")
            .field("model_name", &self.model_name)
            .field("input_name", &self.input_name)
            .field("classes", &self.names.len())
            .field("input_size", &self.input_size)
            .finish_non_exhaustive()
    }
}

impl YoloModel {
    /// Load a YOLOv8 ONNX export from disk
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            return Err(DetectionError::ModelNotFound(model_path.display().to_string()).into());
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        if session.outputs.is_empty() {
            return Err(anyhow::anyhow!(
                "Detection model {} declares no outputs",
                model_path.display()
            ));
        }

        if let Some(input) = session.inputs.first() {
            debug!("Detection model input shape: {:?}", input.input_type);
        }

        let embedded_names = session
            .metadata()
            .ok()
            .and_then(|metadata| metadata.custom(NAMES_METADATA_KEY).ok().flatten());

        let names = match embedded_names.as_deref().map(parse_names_metadata) {
            Some(Some(names)) => {
                debug!("Using {} labels from model metadata", names.len());
                names
            }
            Some(None) => {
                warn!("Unreadable label metadata in model, falling back to COCO labels");
                coco_label_map()
            }
            None => {
                debug!("Model carries no label metadata, using COCO labels");
                coco_label_map()
            }
        };

        let model_name = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "yolo".to_string());

        info!(
            "✅ Detection model {} loaded ({} classes, CPU-only)",
            model_name,
            names.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            names,
            model_name,
            input_size: YOLO_INPUT_SIZE,
        })
    }

    pub fn names(&self) -> &LabelMap {
        &self.names
    }

    fn run(&self, image_path: &Path) -> Result<Vec<PredictedBox>, DetectionError> {
        let (image, image_info) = load_image_file(image_path)?;
        debug!(
            "Decoded image: {}x{}, {} bytes",
            image_info.width, image_info.height, image_info.size_bytes
        );

        let (input, letterbox) = preprocess_for_yolo(&image, self.input_size);
        let output = self
            .infer(input)
            .map_err(|e| DetectionError::ModelFailure(format!("{:#}", e)))?;

        let output = output
            .into_dimensionality::<Ix3>()
            .map_err(|e| DetectionError::ModelFailure(format!("Unexpected output rank: {}", e)))?;
        let shape = output.shape().to_vec();
        if shape[0] != 1 || shape[1].min(shape[2]) <= 4 {
            return Err(DetectionError::ModelFailure(format!(
                "Unexpected output shape: {:?}",
                shape
            )));
        }

        // Exports are [1, 4 + C, N]; some tools transpose to [1, N, 4 + C]
        let batch = output.index_axis(Axis(0), 0);
        let rows = if shape[1] < shape[2] {
            batch.reversed_axes()
        } else {
            batch
        };

        let candidates = decode_candidates(rows, CONFIDENCE_THRESHOLD);
        let kept = non_max_suppression(candidates, IOU_THRESHOLD, MAX_DETECTIONS);

        Ok(to_original_space(kept, &letterbox))
    }

    fn infer(&self, input: ndarray::Array4<f32>) -> Result<ndarray::ArrayD<f32>> {
        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = lock_session(&self.session);

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        // load() guarantees at least one declared output
        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        Ok(output.to_owned())
    }
}

impl DetectionModel for YoloModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn predict(&self, image_path: &Path) -> Result<Prediction, DetectionError> {
        let boxes = self.run(image_path)?;
        Ok(Prediction {
            names: self.names.clone(),
            boxes,
        })
    }
}

/// Lock the session, recovering it if an earlier run panicked while holding it
fn lock_session<T>(session: &Mutex<T>) -> MutexGuard<'_, T> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Turn raw rows of `[cx, cy, w, h, score_0, .., score_C-1]` into candidates
/// whose best class score reaches `conf_threshold`.
pub fn decode_candidates(rows: ArrayView2<f32>, conf_threshold: f32) -> Vec<Candidate> {
    rows.outer_iter()
        .filter_map(|row| {
            let (class_index, confidence) = row
                .iter()
                .skip(4)
                .copied()
                .enumerate()
                .fold((0usize, f32::MIN), |best, (i, score)| {
                    if score > best.1 {
                        (i, score)
                    } else {
                        best
                    }
                });

            if confidence < conf_threshold {
                return None;
            }

            let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
            Some(Candidate {
                class_index,
                confidence,
                xyxy: [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0],
            })
        })
        .collect()
}

/// Class-wise non-maximum suppression
///
/// Output is ordered by descending confidence and capped at `max_detections`.
pub fn non_max_suppression(
    mut candidates: Vec<Candidate>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if keep.len() >= max_detections {
            break;
        }
        let suppressed = keep.iter().any(|kept| {
            kept.class_index == candidate.class_index
                && calculate_iou(&kept.xyxy, &candidate.xyxy) > iou_threshold
        });
        if !suppressed {
            keep.push(candidate);
        }
    }

    keep
}

/// Intersection over union of two `[x1, y1, x2, y2]` boxes
pub fn calculate_iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
    let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
    let union = area_a + area_b - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

fn to_original_space(candidates: Vec<Candidate>, letterbox: &LetterboxInfo) -> Vec<PredictedBox> {
    candidates
        .into_iter()
        .map(|c| PredictedBox {
            class_index: c.class_index,
            confidence: c.confidence,
            xyxy: letterbox.map_box(c.xyxy),
        })
        .collect()
}
