// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for YOLO detection

use image::{imageops::FilterType, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Default square input size for YOLOv8 exports
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Letterbox padding value used during training
pub const PAD_VALUE: u8 = 114;

/// Scaling and padding applied by [`letterbox`]
///
/// Used to map detection boxes back to original image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxInfo {
    /// Scale factor applied
    pub scale: f32,
    /// X offset from padding
    pub offset_x: u32,
    /// Y offset from padding
    pub offset_y: u32,
    /// Original image width
    pub original_width: u32,
    /// Original image height
    pub original_height: u32,
}

impl LetterboxInfo {
    pub fn new(orig_w: u32, orig_h: u32, target_size: u32) -> Self {
        if orig_w == 0 || orig_h == 0 {
            return Self {
                scale: 1.0,
                offset_x: 0,
                offset_y: 0,
                original_width: orig_w,
                original_height: orig_h,
            };
        }

        let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
        let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
        let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

        Self {
            scale,
            offset_x: (target_size - new_w) / 2,
            offset_y: (target_size - new_h) / 2,
            original_width: orig_w,
            original_height: orig_h,
        }
    }

    /// Map a point from model input space back to original image space
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let orig_x = (x - self.offset_x as f32) / self.scale;
        let orig_y = (y - self.offset_y as f32) / self.scale;
        (
            orig_x.clamp(0.0, self.original_width as f32),
            orig_y.clamp(0.0, self.original_height as f32),
        )
    }

    /// Map an `[x1, y1, x2, y2]` box back to original image space
    pub fn map_box(&self, xyxy: [f32; 4]) -> [f32; 4] {
        let (x1, y1) = self.map_to_original(xyxy[0], xyxy[1]);
        let (x2, y2) = self.map_to_original(xyxy[2], xyxy[3]);
        [x1, y1, x2, y2]
    }
}

/// Resize with aspect ratio preserved, centred on a `target_size` square
/// filled with [`PAD_VALUE`].
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (RgbImage, LetterboxInfo) {
    let (orig_w, orig_h) = image.dimensions();
    let info = LetterboxInfo::new(orig_w, orig_h, target_size);
    let mut output = RgbImage::from_pixel(
        target_size,
        target_size,
        Rgb([PAD_VALUE, PAD_VALUE, PAD_VALUE]),
    );

    if orig_w == 0 || orig_h == 0 {
        return (output, info);
    }

    let new_w = target_size - 2 * info.offset_x;
    let new_h = target_size - 2 * info.offset_y;
    let resized = image
        .resize_exact(new_w.max(1), new_h.max(1), FilterType::Triangle)
        .to_rgb8();

    image::imageops::replace(
        &mut output,
        &resized,
        info.offset_x as i64,
        info.offset_y as i64,
    );

    (output, info)
}

/// Preprocess an image for YOLO detection
///
/// Steps:
/// 1. Letterbox to `target_size` x `target_size`
/// 2. Scale pixels to [0, 1]
/// 3. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_yolo(image: &DynamicImage, target_size: u32) -> (Array4<f32>, LetterboxInfo) {
    let (rgb, info) = letterbox(image, target_size);
    let size = target_size as usize;

    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, info)
}
