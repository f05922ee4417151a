// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Status endpoints: `GET /` and `GET /health`

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;
use crate::version;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub gpu: bool,
    pub service: String,
    pub version: String,
    pub endpoints: Vec<EndpointInfo>,
}

/// Routes served by this process, in the order they are advertised
pub const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("/", "GET", "Root endpoint"),
    ("/ocr", "POST", "File upload OCR"),
    ("/ocr/base64", "POST", "Base64 image OCR"),
    ("/health", "GET", "Health check"),
];

/// GET /
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        status: "healthy".to_string(),
        service: version::ROOT_SERVICE_NAME.to_string(),
        version: version::VERSION.to_string(),
    })
}

/// GET /health - Detailed health check
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        gpu: state.gpu,
        service: version::SERVICE_NAME.to_string(),
        version: version::VERSION.to_string(),
        endpoints: ENDPOINTS
            .iter()
            .map(|(path, method, description)| EndpointInfo {
                path: path.to_string(),
                method: method.to_string(),
                description: description.to_string(),
            })
            .collect(),
    })
}
