// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime session construction shared by the OCR models

use anyhow::{Context, Result};
#[cfg(feature = "cuda")]
use ort::execution_providers::CUDAExecutionProvider;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;
use tracing::{debug, warn};

/// Intra-op threads per session
const INTRA_THREADS: usize = 4;

/// Build an optimized session for `model_path`.
///
/// Returns the session and whether a GPU execution provider was requested
/// and compiled in. CPU is always registered as the fallback provider.
pub fn build_session(model_path: &Path, use_gpu: bool) -> Result<(Session, bool)> {
    if !model_path.exists() {
        anyhow::bail!("OCR model not found: {}", model_path.display());
    }

    let gpu = use_gpu && cfg!(feature = "cuda");
    let mut providers = Vec::new();

    #[cfg(feature = "cuda")]
    if gpu {
        providers.push(CUDAExecutionProvider::default().build());
    }

    if use_gpu && !gpu {
        warn!("GPU requested but the binary was built without the `cuda` feature; using CPU");
    }

    providers.push(CPUExecutionProvider::default().build());

    let session = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers(providers)
        .context("Failed to set execution providers")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(INTRA_THREADS)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

    if let Some(input) = session.inputs.first() {
        debug!(
            "{} input '{}': {:?}",
            model_path.display(),
            input.name,
            input.input_type
        );
    }

    Ok((session, gpu))
}

/// First input name of a session, or `fallback` for models that expose none
pub fn input_name(session: &Session, fallback: &str) -> String {
    session
        .inputs
        .first()
        .map(|input| input.name.clone())
        .unwrap_or_else(|| fallback.to_string())
}
