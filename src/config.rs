// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration from command-line flags and environment variables

use clap::Parser;
use std::path::PathBuf;

use crate::api::http_server::DEFAULT_MAX_BODY_BYTES;
use crate::vision::OcrModelConfig;

/// PaddleOCR HTTP service
#[derive(Parser, Debug, Clone)]
#[command(name = "paddleocr-service")]
#[command(version)]
#[command(about = "HTTP service exposing PaddleOCR text recognition", long_about = None)]
pub struct ServiceConfig {
    /// Address to bind
    #[arg(long, env = "OCR_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "OCR_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory with det_model.onnx, cls_model.onnx, rec_model.onnx and ppocr_keys.txt
    #[arg(long, env = "OCR_MODEL_DIR", default_value = "./models/paddleocr-onnx")]
    pub model_dir: PathBuf,

    /// Recognition language (selects ppocr_keys_<lang>.txt when present)
    #[arg(long, env = "OCR_LANG", default_value = "en")]
    pub lang: String,

    /// Run the 0°/180° text direction classifier
    #[arg(long, env = "OCR_USE_ANGLE_CLS", default_value_t = true, action = clap::ArgAction::Set)]
    pub use_angle_cls: bool,

    /// Use the CUDA execution provider (requires the `cuda` feature)
    #[arg(long, env = "OCR_USE_GPU", default_value_t = false, action = clap::ArgAction::Set)]
    pub use_gpu: bool,

    /// Detection probability threshold
    #[arg(long, env = "OCR_DET_THRESHOLD", default_value_t = 0.3)]
    pub det_threshold: f32,

    /// Maximum request body size in bytes
    #[arg(long, env = "OCR_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl ServiceConfig {
    pub fn model_config(&self) -> OcrModelConfig {
        OcrModelConfig {
            model_dir: self.model_dir.clone(),
            lang: self.lang.clone(),
            use_angle_cls: self.use_angle_cls,
            use_gpu: self.use_gpu,
            det_threshold: self.det_threshold,
        }
    }
}
