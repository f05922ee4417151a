// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end PaddleOCR pipeline: detection, optional angle classification,
//! recognition and reading-order grouping

use anyhow::Result;
use image::{DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::classification::OcrAngleClassifier;
use super::detection::OcrDetectionModel;
use super::engine::{quad_bounds, OcrEngine, OcrLine, OcrWord, Quad};
use super::recognition::{OcrRecognitionModel, RecognizedText};

pub const DET_MODEL_FILE: &str = "det_model.onnx";
pub const CLS_MODEL_FILE: &str = "cls_model.onnx";
pub const REC_MODEL_FILE: &str = "rec_model.onnx";
pub const DEFAULT_DICT_FILE: &str = "ppocr_keys.txt";

/// Recognitions scoring below this are discarded
pub const DROP_SCORE: f32 = 0.5;

/// Crops at least this much taller than wide are treated as vertical text
const VERTICAL_ASPECT: f32 = 1.5;

/// Configuration for loading the PaddleOCR models
#[derive(Debug, Clone)]
pub struct OcrModelConfig {
    /// Directory holding the ONNX models and dictionary
    pub model_dir: PathBuf,
    /// Language code, used to pick `ppocr_keys_<lang>.txt` when present
    pub lang: String,
    pub use_angle_cls: bool,
    pub use_gpu: bool,
    pub det_threshold: f32,
}

impl Default for OcrModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./models/paddleocr-onnx"),
            lang: "en".to_string(),
            use_angle_cls: true,
            use_gpu: false,
            det_threshold: 0.3,
        }
    }
}

impl OcrModelConfig {
    /// Language specific dictionary if present, else the default one
    pub fn dictionary_path(&self) -> PathBuf {
        let localized = self
            .model_dir
            .join(format!("ppocr_keys_{}.txt", self.lang));
        if localized.exists() {
            localized
        } else {
            self.model_dir.join(DEFAULT_DICT_FILE)
        }
    }
}

/// PaddleOCR engine backed by ONNX Runtime sessions
#[derive(Debug, Clone)]
pub struct PaddleOcrModel {
    detection: OcrDetectionModel,
    classifier: Option<OcrAngleClassifier>,
    recognition: OcrRecognitionModel,
}

impl PaddleOcrModel {
    /// Load all models from `config.model_dir`.
    ///
    /// Expected files:
    /// - det_model.onnx (text detection)
    /// - cls_model.onnx (direction classifier, optional)
    /// - rec_model.onnx (text recognition)
    /// - ppocr_keys.txt or ppocr_keys_<lang>.txt (character dictionary)
    pub fn load(config: &OcrModelConfig) -> Result<Self> {
        let dir = config.model_dir.as_path();
        if !dir.is_dir() {
            anyhow::bail!("OCR model directory not found: {}", dir.display());
        }

        let detection = OcrDetectionModel::new(dir.join(DET_MODEL_FILE), config.use_gpu)?
            .with_threshold(config.det_threshold);

        let classifier = if config.use_angle_cls {
            load_classifier(dir, config.use_gpu)?
        } else {
            None
        };

        let recognition = OcrRecognitionModel::new(
            dir.join(REC_MODEL_FILE),
            config.dictionary_path(),
            config.use_gpu,
        )?;

        info!(
            "PaddleOCR models loaded from {} (lang: {}, angle cls: {}, gpu: {})",
            dir.display(),
            config.lang,
            classifier.is_some(),
            detection.uses_gpu()
        );

        Ok(Self {
            detection,
            classifier,
            recognition,
        })
    }
}

fn load_classifier(dir: &Path, use_gpu: bool) -> Result<Option<OcrAngleClassifier>> {
    let path = dir.join(CLS_MODEL_FILE);
    if !path.exists() {
        warn!(
            "Angle classifier not found at {}; continuing without it",
            path.display()
        );
        return Ok(None);
    }
    OcrAngleClassifier::new(path, use_gpu).map(Some)
}

impl OcrEngine for PaddleOcrModel {
    fn ocr(&self, image: &DynamicImage) -> Result<Vec<OcrLine>> {
        let started = Instant::now();
        let boxes = self.detection.detect(image)?;

        let mut words = Vec::with_capacity(boxes.len());
        for text_box in &boxes {
            let Some(mut crop) = crop_region(image, &text_box.quad) else {
                continue;
            };

            if crop.height() as f32 / crop.width() as f32 >= VERTICAL_ASPECT {
                crop = crop.rotate270();
            }

            if let Some(classifier) = &self.classifier {
                crop = classifier.correct(crop)?;
            }

            let recognized = self.recognition.recognize(&crop)?;
            if !keep(&recognized) {
                continue;
            }

            words.push(OcrWord {
                coordinates: text_box.quad,
                text: recognized.text,
                confidence: recognized.confidence,
            });
        }

        let lines = group_into_lines(words);
        debug!(
            "OCR pipeline: {} regions -> {} lines in {}ms",
            boxes.len(),
            lines.len(),
            started.elapsed().as_millis()
        );

        Ok(lines)
    }

    fn uses_gpu(&self) -> bool {
        self.detection.uses_gpu()
    }
}

/// A recognition survives when it has visible text scoring at least `DROP_SCORE`
fn keep(recognized: &RecognizedText) -> bool {
    !recognized.is_empty() && recognized.confidence >= DROP_SCORE
}

/// Crop the axis-aligned bounds of `quad`, clamped to the image.
/// `None` when the clamped area is empty.
pub fn crop_region(image: &DynamicImage, quad: &Quad) -> Option<DynamicImage> {
    let (img_w, img_h) = image.dimensions();
    let [min_x, min_y, max_x, max_y] = quad_bounds(quad);

    let x0 = (min_x.floor().max(0.0) as u32).min(img_w);
    let y0 = (min_y.floor().max(0.0) as u32).min(img_h);
    let x1 = (max_x.ceil().max(0.0) as u32).min(img_w);
    let y1 = (max_y.ceil().max(0.0) as u32).min(img_h);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(image.crop_imm(x0, y0, x1 - x0, y1 - y0))
}

/// Group words into lines in reading order.
///
/// Words are sorted top to bottom; a word joins the current line when its
/// vertical centre falls inside the line's vertical span. Each line is then
/// ordered left to right.
pub fn group_into_lines(mut words: Vec<OcrWord>) -> Vec<OcrLine> {
    words.sort_by(|a, b| {
        let [ax, ay, _, _] = quad_bounds(&a.coordinates);
        let [bx, by, _, _] = quad_bounds(&b.coordinates);
        ay.total_cmp(&by).then(ax.total_cmp(&bx))
    });

    let mut lines: Vec<OcrLine> = Vec::new();
    let mut span: Option<(f32, f32)> = None;

    for word in words {
        let [_, top, _, bottom] = quad_bounds(&word.coordinates);
        let centre = (top + bottom) / 2.0;

        match (span, lines.last_mut()) {
            (Some((line_top, line_bottom)), Some(line))
                if centre >= line_top && centre <= line_bottom =>
            {
                line.words.push(word);
                span = Some((line_top.min(top), line_bottom.max(bottom)));
            }
            _ => {
                lines.push(OcrLine::new(vec![word]));
                span = Some((top, bottom));
            }
        }
    }

    for line in &mut lines {
        line.words.sort_by(|a, b| {
            let [ax, ..] = quad_bounds(&a.coordinates);
            let [bx, ..] = quad_bounds(&b.coordinates);
            ax.total_cmp(&bx)
        });
    }

    lines
}
