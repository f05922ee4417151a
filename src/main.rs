// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use paddleocr_service::{start_server, version, OcrEngine, PaddleOcrModel, ServiceConfig};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServiceConfig::parse();
    info!("Starting {}", version::get_version_string());

    let model_config = config.model_config();
    let engine = tokio::task::spawn_blocking(move || PaddleOcrModel::load(&model_config))
        .await
        .context("OCR model loading task failed")?;

    let engine: Arc<dyn OcrEngine> = match engine {
        Ok(model) => {
            info!("PaddleOCR initialized successfully (gpu: {})", model.uses_gpu());
            Arc::new(model)
        }
        Err(e) => {
            error!("Failed to initialize PaddleOCR: {:#}", e);
            return Err(e);
        }
    };

    start_server(&config, engine).await
}
