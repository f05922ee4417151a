// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engine abstraction shared by the HTTP handlers

use anyhow::Result;
use image::DynamicImage;

/// Four `(x, y)` corners in original image pixels:
/// top-left, top-right, bottom-right, bottom-left.
pub type Quad = [[f32; 2]; 4];

/// Axis-aligned bounds of a quad as `[min_x, min_y, max_x, max_y]`
pub fn quad_bounds(quad: &Quad) -> [f32; 4] {
    quad.iter().fold(
        [f32::MAX, f32::MAX, f32::MIN, f32::MIN],
        |[min_x, min_y, max_x, max_y], [x, y]| {
            [min_x.min(*x), min_y.min(*y), max_x.max(*x), max_y.max(*y)]
        },
    )
}

/// A single recognized word (text region) with its location
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWord {
    pub coordinates: Quad,
    pub text: String,
    /// Recognition confidence (0.0-1.0)
    pub confidence: f32,
}

/// Words that share a text line, ordered left to right
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrLine {
    pub words: Vec<OcrWord>,
}

impl OcrLine {
    pub fn new(words: Vec<OcrWord>) -> Self {
        Self { words }
    }

    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An OCR engine: one inference call per image.
///
/// Implementations are shared across all requests, so they must be
/// `Send + Sync` and do their own internal locking.
pub trait OcrEngine: Send + Sync {
    /// Run detection, classification and recognition on an image.
    /// Lines are returned top to bottom.
    fn ocr(&self, image: &DynamicImage) -> Result<Vec<OcrLine>>;

    /// Whether inference runs on a GPU execution provider
    fn uses_gpu(&self) -> bool;
}
