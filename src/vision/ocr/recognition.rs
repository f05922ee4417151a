// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! Recognizes the text content of a cropped region. The model emits a
//! probability distribution over the character dictionary per timestep,
//! decoded with greedy CTC.

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use ndarray::{ArrayView2, ArrayViewD};
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::preprocess_for_recognition;
use super::session::{build_session, input_name};

/// CTC blank token index
const BLANK_INDEX: usize = 0;

/// Recognized text with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean probability of the emitted characters (0.0-1.0)
    pub confidence: f32,
}

impl RecognizedText {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Clone)]
pub struct OcrRecognitionModel {
    session: Arc<Mutex<Session>>,
    /// Index 0 is the CTC blank
    dictionary: Arc<Vec<char>>,
    input_name: String,
}

impl std::fmt::Debug for OcrRecognitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrRecognitionModel")
            .field("dictionary_size", &self.dictionary.len())
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OcrRecognitionModel {
    /// Load the recognition model and its character dictionary
    pub fn new<P: AsRef<Path>>(model_path: P, dict_path: P, use_gpu: bool) -> Result<Self> {
        let model_path = model_path.as_ref();
        let dict_path = dict_path.as_ref();

        if !dict_path.exists() {
            anyhow::bail!(
                "OCR character dictionary not found: {}",
                dict_path.display()
            );
        }

        let contents = std::fs::read_to_string(dict_path)
            .with_context(|| format!("Failed to read dictionary: {}", dict_path.display()))?;
        let dictionary = parse_dictionary(&contents);
        info!(
            "Loaded character dictionary with {} characters",
            dictionary.len()
        );

        info!("Loading OCR recognition model from {}", model_path.display());
        let (session, _) = build_session(model_path, use_gpu)?;
        let input_name = input_name(&session, "x");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            dictionary: Arc::new(dictionary),
            input_name,
        })
    }

    /// Recognize the text in a cropped region
    pub fn recognize(&self, crop: &DynamicImage) -> Result<RecognizedText> {
        let input = preprocess_for_recognition(crop);

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("recognition session lock poisoned"))?;

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Recognition inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract recognition output")?;

        let probs = sequence_view(&output)?;
        let recognized = ctc_greedy_decode(probs, &self.dictionary);
        debug!(
            "Recognized '{}' ({:.3})",
            recognized.text, recognized.confidence
        );

        Ok(recognized)
    }
}

/// Parse a PaddleOCR dictionary file: one character per line.
///
/// The CTC blank is prepended and a space appended, matching how the
/// recognition models are exported.
pub fn parse_dictionary(contents: &str) -> Vec<char> {
    let mut dictionary = vec![' '];
    dictionary.extend(
        contents
            .lines()
            .filter_map(|line| line.trim_end_matches('\r').chars().next()),
    );
    dictionary.push(' ');
    dictionary
}

/// View a `[1, T, C]` or `[T, C]` recognition output as `[T, C]`
fn sequence_view<'a>(output: &'a ArrayViewD<'a, f32>) -> Result<ArrayView2<'a, f32>> {
    let (steps, classes) = match output.shape() {
        [1, t, c] | [t, c] => (*t, *c),
        other => anyhow::bail!("Unexpected recognition output shape: {:?}", other),
    };

    output
        .view()
        .into_shape_with_order((steps, classes))
        .context("Recognition output is not contiguous")
}

/// Greedy (best path) CTC decoding: take the arg-max class per timestep,
/// collapse repeats and drop blanks.
pub fn ctc_greedy_decode(probs: ArrayView2<f32>, dictionary: &[char]) -> RecognizedText {
    let mut text = String::new();
    let mut confidences = Vec::new();
    let mut prev_index: Option<usize> = None;

    for step in probs.rows() {
        let Some((max_index, max_prob)) = step
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            continue;
        };

        if max_index != BLANK_INDEX && Some(max_index) != prev_index {
            if let Some(ch) = dictionary.get(max_index) {
                text.push(*ch);
                confidences.push(max_prob);
            }
        }

        prev_index = Some(max_index);
    }

    let confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f32>() / confidences.len() as f32
    };

    RecognizedText {
        text,
        confidence: if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        },
    }
}
