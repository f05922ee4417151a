// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::health::{health_handler, root_handler};
use super::ocr::{ocr_base64_handler, ocr_upload_handler};
use crate::config::ServiceConfig;
use crate::vision::image_utils::MAX_IMAGE_SIZE;
use crate::vision::OcrEngine;

/// Default request body limit: a base64-encoded image at `MAX_IMAGE_SIZE`
/// plus 1MB for JSON framing, data URL headers and line breaks
pub const DEFAULT_MAX_BODY_BYTES: usize = MAX_IMAGE_SIZE.div_ceil(3) * 4 + 1024 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Process-wide OCR engine
    pub engine: Arc<dyn OcrEngine>,
    /// Reported by `/health`
    pub gpu: bool,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        let gpu = engine.uses_gpu();
        Self {
            engine,
            gpu,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// Build the router with all endpoints, CORS and request tracing
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ocr", post(ocr_upload_handler))
        .route("/ocr/base64", post(ocr_base64_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn start_server(config: &ServiceConfig, engine: Arc<dyn OcrEngine>) -> anyhow::Result<()> {
    let state = AppState::new(engine).with_max_body_bytes(config.max_body_bytes);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let addr = listener.local_addr()?;

    info!("OCR server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("OCR server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
