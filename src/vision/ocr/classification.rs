// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text direction classifier (0° / 180°)

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

use super::preprocessing::preprocess_for_classification;
use super::session::{build_session, input_name};

/// Score a crop must reach before it is treated as upside down
pub const DEFAULT_CLS_THRESHOLD: f32 = 0.9;

/// Classifier label index for text rotated by 180°
const LABEL_ROTATED_180: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    pub index: usize,
    pub score: f32,
}

impl Angle {
    /// Pick the highest scoring label; `None` for an empty score list
    pub fn from_scores(scores: &[f32]) -> Option<Self> {
        scores
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, score)| Self { index, score })
    }

    pub fn is_upside_down(&self, threshold: f32) -> bool {
        self.index == LABEL_ROTATED_180 && self.score > threshold
    }
}

#[derive(Clone)]
pub struct OcrAngleClassifier {
    session: Arc<Mutex<Session>>,
    input_name: String,
    threshold: f32,
}

impl std::fmt::Debug for OcrAngleClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrAngleClassifier")
            .field("input_name", &self.input_name)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl OcrAngleClassifier {
    /// Load the direction classifier (`cls_model.onnx`)
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool) -> Result<Self> {
        let model_path = model_path.as_ref();
        info!("Loading OCR angle classifier from {}", model_path.display());

        let (session, _) = build_session(model_path, use_gpu)?;
        let input_name = input_name(&session, "x");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            threshold: DEFAULT_CLS_THRESHOLD,
        })
    }

    pub fn classify(&self, crop: &DynamicImage) -> Result<Angle> {
        let input = preprocess_for_classification(crop);

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("classifier session lock poisoned"))?;

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Angle classification failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract classifier output")?;

        let scores: Vec<f32> = output.iter().copied().collect();
        Angle::from_scores(&scores).ok_or_else(|| anyhow!("Angle classifier returned no scores"))
    }

    /// Rotate `crop` by 180° if the classifier says it is upside down
    pub fn correct(&self, crop: DynamicImage) -> Result<DynamicImage> {
        let angle = self.classify(&crop)?;
        if angle.is_upside_down(self.threshold) {
            Ok(crop.rotate180())
        } else {
            Ok(crop)
        }
    }
}
