// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR response types

use serde::{Deserialize, Serialize};

use crate::vision::ocr::{OcrLine, Quad};

/// One recognized text region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrRecord {
    pub text: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Four `[x, y]` corners: top-left, top-right, bottom-right, bottom-left
    pub coordinates: Quad,
}

/// Response from `POST /ocr`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrUploadResponse {
    pub filename: Option<String>,
    pub results: Vec<OcrRecord>,
}

/// Response from `POST /ocr/base64`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrBase64Response {
    pub results: Vec<OcrRecord>,
}

/// Flatten the engine's per-line output into records, keeping line order
/// then word order
pub fn flatten_results(lines: Vec<OcrLine>) -> Vec<OcrRecord> {
    lines
        .into_iter()
        .flat_map(|line| line.words)
        .map(|word| OcrRecord {
            text: word.text,
            confidence: normalize_confidence(word.confidence),
            coordinates: word.coordinates,
        })
        .collect()
}

/// Clamp into [0, 1]; NaN and infinities become 0.0
fn normalize_confidence(confidence: f32) -> f32 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
