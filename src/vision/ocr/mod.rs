// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR integration for text extraction from images
//!
//! Components:
//! - `engine` - The `OcrEngine` trait and its nested line/word output
//! - `detection` - Text region detection (DB)
//! - `classification` - 0°/180° text direction classifier
//! - `recognition` - Text recognition (CTC) from detected regions
//! - `preprocessing` - Image to tensor conversion for the models
//! - `model` - Combined OCR pipeline

pub mod classification;
pub mod detection;
pub mod engine;
pub mod model;
pub mod preprocessing;
pub mod recognition;
mod session;

pub use classification::{Angle, OcrAngleClassifier};
pub use detection::{DetectionParams, OcrDetectionModel, TextBox};
pub use engine::{quad_bounds, OcrEngine, OcrLine, OcrWord, Quad};
pub use model::{OcrModelConfig, PaddleOcrModel};
pub use recognition::{OcrRecognitionModel, RecognizedText};
