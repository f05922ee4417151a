// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the PaddleOCR detection, classification and
//! recognition models

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use ndarray::Array4;

/// Longest side limit for the detection input
pub const DET_LIMIT_SIDE_LEN: u32 = 960;

/// Detection input dimensions must be multiples of this stride
pub const DET_STRIDE: u32 = 32;

/// Recognition model input height (PP-OCR English/multilingual rec models use 48)
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Minimum recognition input width; narrower crops are zero padded
pub const REC_MIN_WIDTH: u32 = 320;

/// Upper bound for recognition input width
pub const REC_MAX_WIDTH: u32 = 2048;

/// Angle classifier input size (height x width)
pub const CLS_INPUT_HEIGHT: u32 = 48;
pub const CLS_INPUT_WIDTH: u32 = 192;

/// Detection normalization (ImageNet)
pub const DET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const DET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Recognition / classification normalization: (x - 0.5) / 0.5
pub const REC_MEAN: [f32; 3] = [0.5, 0.5, 0.5];
pub const REC_STD: [f32; 3] = [0.5, 0.5, 0.5];

/// Scale factors applied when resizing for detection.
/// Used to map detected boxes back to original image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeInfo {
    pub original_width: u32,
    pub original_height: u32,
    pub resized_width: u32,
    pub resized_height: u32,
}

impl ResizeInfo {
    /// Compute detection input dimensions for an image.
    ///
    /// The longest side is capped at `limit_side_len`, then both sides are
    /// rounded to the nearest multiple of [`DET_STRIDE`] (never below it).
    pub fn for_detection(width: u32, height: u32, limit_side_len: u32) -> Self {
        let max_side = width.max(height).max(1);
        let ratio = if max_side > limit_side_len {
            limit_side_len as f32 / max_side as f32
        } else {
            1.0
        };

        let round_to_stride = |v: u32| -> u32 {
            let scaled = (v as f32 * ratio).round() as u32;
            let rounded = ((scaled as f32 / DET_STRIDE as f32).round() as u32) * DET_STRIDE;
            rounded.max(DET_STRIDE)
        };

        Self {
            original_width: width,
            original_height: height,
            resized_width: round_to_stride(width),
            resized_height: round_to_stride(height),
        }
    }

    pub fn ratio_w(&self) -> f32 {
        self.resized_width as f32 / self.original_width.max(1) as f32
    }

    pub fn ratio_h(&self) -> f32 {
        self.resized_height as f32 / self.original_height.max(1) as f32
    }

    /// Map a point from detection input space back to the original image,
    /// clamped to image bounds
    pub fn map_to_original(&self, x: f32, y: f32) -> [f32; 2] {
        let ox = (x / self.ratio_w()).clamp(0.0, self.original_width as f32);
        let oy = (y / self.ratio_h()).clamp(0.0, self.original_height as f32);
        [ox, oy]
    }
}

/// Preprocess an image for text detection.
///
/// Resize per [`ResizeInfo::for_detection`], normalize with ImageNet
/// mean/std and lay out as NCHW `[1, 3, H, W]`.
pub fn preprocess_for_detection(image: &DynamicImage) -> (Array4<f32>, ResizeInfo) {
    let (w, h) = image.dimensions();
    let info = ResizeInfo::for_detection(w, h, DET_LIMIT_SIDE_LEN);

    let resized = image.resize_exact(info.resized_width, info.resized_height, FilterType::Triangle);
    let tensor = normalize_to_tensor(&resized, info.resized_width, &DET_MEAN, &DET_STD);

    (tensor, info)
}

/// Preprocess a cropped text region for recognition.
///
/// Height is fixed at [`REC_INPUT_HEIGHT`]; width follows the aspect ratio
/// and is zero padded on the right up to [`REC_MIN_WIDTH`].
pub fn preprocess_for_recognition(image: &DynamicImage) -> Array4<f32> {
    let (orig_w, orig_h) = image.dimensions();

    let scale = REC_INPUT_HEIGHT as f32 / orig_h.max(1) as f32;
    let new_width = ((orig_w as f32 * scale).ceil() as u32).clamp(1, REC_MAX_WIDTH);
    let padded_width = new_width.max(REC_MIN_WIDTH);

    let resized = image.resize_exact(new_width, REC_INPUT_HEIGHT, FilterType::Triangle);
    normalize_to_tensor(&resized, padded_width, &REC_MEAN, &REC_STD)
}

/// Preprocess a cropped text region for the angle classifier
pub fn preprocess_for_classification(image: &DynamicImage) -> Array4<f32> {
    let (orig_w, orig_h) = image.dimensions();

    let scale = CLS_INPUT_HEIGHT as f32 / orig_h.max(1) as f32;
    let new_width = ((orig_w as f32 * scale).ceil() as u32).clamp(1, CLS_INPUT_WIDTH);

    let resized = image.resize_exact(new_width, CLS_INPUT_HEIGHT, FilterType::Triangle);
    normalize_to_tensor(&resized, CLS_INPUT_WIDTH, &REC_MEAN, &REC_STD)
}

/// Normalize `(pixel / 255 - mean) / std` into an NCHW tensor of width
/// `tensor_width`. Columns beyond the image width stay zero.
fn normalize_to_tensor(
    image: &DynamicImage,
    tensor_width: u32,
    mean: &[f32; 3],
    std: &[f32; 3],
) -> Array4<f32> {
    let rgb = image.to_rgb8();
    let (w, h) = rgb.dimensions();
    let mut tensor = Array4::zeros((1, 3, h as usize, tensor_width as usize));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        if x >= tensor_width || x >= w {
            continue;
        }
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - mean[c]) / std[c];
        }
    }

    tensor
}
