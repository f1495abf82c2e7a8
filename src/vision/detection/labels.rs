// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class label maps for detection models

use super::model::LabelMap;

/// COCO 80 class labels, used when a model carries no label metadata
pub const COCO_LABELS: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
    "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

/// Label map for the COCO-80 classes
pub fn coco_label_map() -> LabelMap {
    COCO_LABELS
        .iter()
        .enumerate()
        .map(|(i, name)| (i, name.to_string()))
        .collect()
}

/// Parse the `names` entry exported into ONNX metadata.
///
/// The value is a dict literal such as `{0: 'person', 1: 'bicycle'}`.
/// Labels may use single or double quotes and contain commas or colons.
/// Returns `None` if the text is not in that shape or names no classes.
pub fn parse_names_metadata(raw: &str) -> Option<LabelMap> {
    let body = raw.trim().strip_prefix('{')?.strip_suffix('}')?;
    let mut chars = body.chars().peekable();
    let mut names = LabelMap::new();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace() || *c == ',') {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut index = String::new();
        while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
            index.push(c);
            chars.next();
        }
        let index: usize = index.parse().ok()?;

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.next()? != ':' {
            return None;
        }
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let quote = chars.next().filter(|c| *c == '\'' || *c == '"')?;
        let mut label = String::new();
        loop {
            match chars.next()? {
                c if c == quote => break,
                c => label.push(c),
            }
        }

        if label.trim().is_empty() {
            return None;
        }
        names.insert(index, label);
    }

    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}
