// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! The DB detection model outputs a per-pixel text probability map. Regions
//! are extracted by thresholding the map, grouping connected pixels, scoring
//! each group and expanding ("unclipping") its box before mapping it back to
//! original image coordinates.

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use ndarray::{ArrayView2, ArrayViewD};
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::engine::Quad;
use super::preprocessing::{preprocess_for_detection, ResizeInfo};
use super::session::{build_session, input_name};

/// Post-processing parameters for the DB probability map
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionParams {
    /// Pixel probability above which a pixel counts as text
    pub threshold: f32,
    /// Minimum mean probability of a region
    pub box_threshold: f32,
    /// Box expansion ratio
    pub unclip_ratio: f32,
    /// Minimum box side, in probability map pixels
    pub min_size: f32,
    /// Maximum number of regions kept per image
    pub max_candidates: usize,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            box_threshold: 0.6,
            unclip_ratio: 1.5,
            min_size: 3.0,
            max_candidates: 1000,
        }
    }
}

/// A detected text region in original image coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub quad: Quad,
    /// Mean text probability inside the region (0.0-1.0)
    pub score: f32,
}

/// PaddleOCR text detection model
#[derive(Clone)]
pub struct OcrDetectionModel {
    session: Arc<Mutex<Session>>,
    input_name: String,
    params: DetectionParams,
    gpu: bool,
}

impl std::fmt::Debug for OcrDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrDetectionModel")
            .field("input_name", &self.input_name)
            .field("params", &self.params)
            .field("gpu", &self.gpu)
            .finish_non_exhaustive()
    }
}

impl OcrDetectionModel {
    /// Load the detection model (`det_model.onnx`)
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool) -> Result<Self> {
        let model_path = model_path.as_ref();
        info!("Loading OCR detection model from {}", model_path.display());

        let (session, gpu) = build_session(model_path, use_gpu)?;
        let input_name = input_name(&session, "x");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            params: DetectionParams::default(),
            gpu,
        })
    }

    /// Override the pixel threshold used to binarize the probability map
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.params.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn uses_gpu(&self) -> bool {
        self.gpu
    }

    /// Detect text regions in an image
    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<TextBox>> {
        let (input, info) = preprocess_for_detection(image);

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("detection session lock poisoned"))?;

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract detection output")?;

        let prob = probability_map(&output)?;
        let boxes = boxes_from_probability_map(prob, &self.params, &info);

        debug!(
            "Detected {} text regions ({}x{} -> {}x{})",
            boxes.len(),
            info.original_width,
            info.original_height,
            info.resized_width,
            info.resized_height
        );

        Ok(boxes)
    }
}

/// View a `[1, 1, H, W]` or `[1, H, W]` detection output as `[H, W]`
fn probability_map<'a>(output: &'a ArrayViewD<'a, f32>) -> Result<ArrayView2<'a, f32>> {
    let (h, w) = match output.shape() {
        [1, 1, h, w] | [1, h, w] => (*h, *w),
        other => anyhow::bail!("Unexpected detection output shape: {:?}", other),
    };

    output
        .view()
        .into_shape_with_order((h, w))
        .context("Detection output is not contiguous")
}

#[derive(Debug)]
struct Region {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    pixels: usize,
    score_sum: f32,
}

/// Extract text boxes from a probability map.
///
/// Boxes are returned in original image coordinates (via `info`) in scan
/// order; callers sort them into reading order.
pub fn boxes_from_probability_map(
    prob: ArrayView2<f32>,
    params: &DetectionParams,
    info: &ResizeInfo,
) -> Vec<TextBox> {
    let (map_h, map_w) = prob.dim();
    if map_h == 0 || map_w == 0 {
        return Vec::new();
    }

    // Probability map may be downsampled relative to the model input
    let scale_x = info.resized_width as f32 / map_w as f32;
    let scale_y = info.resized_height as f32 / map_h as f32;

    let mut visited = vec![false; map_h * map_w];
    let mut boxes = Vec::new();

    'scan: for y in 0..map_h {
        for x in 0..map_w {
            if visited[y * map_w + x] || prob[[y, x]] <= params.threshold {
                continue;
            }

            let region = flood_fill(&prob, &mut visited, x, y, params.threshold);
            if let Some(text_box) = region_to_box(&region, params, info, scale_x, scale_y) {
                boxes.push(text_box);
                if boxes.len() >= params.max_candidates {
                    break 'scan;
                }
            }
        }
    }

    boxes
}

/// 8-connected flood fill over pixels above `threshold`
fn flood_fill(
    prob: &ArrayView2<f32>,
    visited: &mut [bool],
    start_x: usize,
    start_y: usize,
    threshold: f32,
) -> Region {
    let (height, width) = prob.dim();
    let mut region = Region {
        min_x: start_x,
        max_x: start_x,
        min_y: start_y,
        max_y: start_y,
        pixels: 0,
        score_sum: 0.0,
    };

    let mut stack = vec![(start_x, start_y)];
    visited[start_y * width + start_x] = true;

    while let Some((x, y)) = stack.pop() {
        region.pixels += 1;
        region.score_sum += prob[[y, x]];
        region.min_x = region.min_x.min(x);
        region.max_x = region.max_x.max(x);
        region.min_y = region.min_y.min(y);
        region.max_y = region.max_y.max(y);

        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                let idx = ny * width + nx;
                if !visited[idx] && prob[[ny, nx]] > threshold {
                    visited[idx] = true;
                    stack.push((nx, ny));
                }
            }
        }
    }

    region
}

fn region_to_box(
    region: &Region,
    params: &DetectionParams,
    info: &ResizeInfo,
    scale_x: f32,
    scale_y: f32,
) -> Option<TextBox> {
    let w = (region.max_x - region.min_x + 1) as f32;
    let h = (region.max_y - region.min_y + 1) as f32;
    if w.min(h) < params.min_size {
        return None;
    }

    let score = region.score_sum / region.pixels as f32;
    if score < params.box_threshold {
        return None;
    }

    // Offset polygon distance: area * ratio / perimeter
    let distance = w * h * params.unclip_ratio / (2.0 * (w + h));
    let x0 = region.min_x as f32 - distance;
    let y0 = region.min_y as f32 - distance;
    let x1 = (region.max_x + 1) as f32 + distance;
    let y1 = (region.max_y + 1) as f32 + distance;

    let [left, top] = info.map_to_original(x0 * scale_x, y0 * scale_y);
    let [right, bottom] = info.map_to_original(x1 * scale_x, y1 * scale_y);
    if right - left < 1.0 || bottom - top < 1.0 {
        return None;
    }

    Some(TextBox {
        quad: [[left, top], [right, top], [right, bottom], [left, bottom]],
        score: score.clamp(0.0, 1.0),
    })
}
