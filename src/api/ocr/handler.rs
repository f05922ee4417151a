// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR endpoint handlers

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use image::DynamicImage;
use tracing::{debug, error, info};

use super::request::OcrBase64Request;
use super::response::{flatten_results, OcrBase64Response, OcrRecord, OcrUploadResponse};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::{decode_base64_image, decode_image_bytes};

/// Multipart field carrying the uploaded image
pub const UPLOAD_FIELD: &str = "file";

/// POST /ocr - Extract text from an uploaded image file
///
/// # Request
/// `multipart/form-data` with the image in the `file` field.
///
/// # Response
/// - `filename`: Name of the uploaded file (null if the client sent none)
/// - `results`: Recognized regions (`text`, `confidence`, `coordinates`)
///
/// # Errors
/// - 500 Internal Server Error: missing file, undecodable image or OCR failure
pub async fn ocr_upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OcrUploadResponse>, ApiError> {
    let (filename, contents) = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            error!("Error reading uploaded image: {}", e.detail());
            return Err(e);
        }
    };

    let name = filename.as_deref().unwrap_or("<unnamed>");
    info!("Processing image: {}", name);

    let results = match decode_and_recognize(&state, &contents).await {
        Ok(results) => results,
        Err(e) => {
            error!("Error processing image {}: {}", name, e.detail());
            return Err(e);
        }
    };

    info!(
        "Successfully processed image: {} ({} regions)",
        name,
        results.len()
    );

    Ok(Json(OcrUploadResponse { filename, results }))
}

/// POST /ocr/base64 - Extract text from a base64-encoded image
///
/// # Request
/// JSON object `{"image": "<base64>"}`; a `data:` URL prefix is accepted.
///
/// # Errors
/// - 400 Bad Request: no `image` key in the body
/// - 500 Internal Server Error: unreadable or oversized body, invalid
///   base64, image or OCR failure
pub async fn ocr_base64_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<OcrBase64Response>, ApiError> {
    let request = body
        .map_err(ApiError::internal)
        .and_then(|body| OcrBase64Request::from_body(&body))
        .map_err(|e| {
            error!("Error processing base64 image: {}", e.detail());
            e
        })?;

    info!("Processing base64 image");

    let results = match recognize_base64(&state, &request.image).await {
        Ok(results) => results,
        Err(e) => {
            error!("Error processing base64 image: {}", e.detail());
            return Err(e);
        }
    };

    info!("Successfully processed base64 image ({} regions)", results.len());

    Ok(Json(OcrBase64Response { results }))
}

/// Pull the `file` field out of a multipart body
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(Option<String>, Bytes), ApiError> {
    let mut multipart = multipart.map_err(ApiError::internal)?;

    while let Some(field) = multipart.next_field().await.map_err(ApiError::internal)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let contents = field.bytes().await.map_err(ApiError::internal)?;
        return Ok((filename, contents));
    }

    Err(ApiError::Internal(format!(
        "No '{}' field in multipart upload",
        UPLOAD_FIELD
    )))
}

async fn decode_and_recognize(state: &AppState, bytes: &[u8]) -> Result<Vec<OcrRecord>, ApiError> {
    let (image, info) = decode_image_bytes(bytes).map_err(ApiError::internal)?;
    debug!(
        "Decoded image: {}x{}, {} bytes",
        info.width, info.height, info.size_bytes
    );
    run_ocr(state, image).await
}

async fn recognize_base64(state: &AppState, data: &str) -> Result<Vec<OcrRecord>, ApiError> {
    let (image, info) = decode_base64_image(data).map_err(ApiError::internal)?;
    debug!(
        "Decoded image: {}x{}, {} bytes",
        info.width, info.height, info.size_bytes
    );
    run_ocr(state, image).await
}

/// Run the shared engine off the async runtime and flatten its output
async fn run_ocr(state: &AppState, image: DynamicImage) -> Result<Vec<OcrRecord>, ApiError> {
    let engine = state.engine.clone();
    let lines = tokio::task::spawn_blocking(move || engine.ocr(&image))
        .await
        .map_err(ApiError::internal)?
        .map_err(|e| ApiError::Internal(format!("{:#}", e)))?;

    Ok(flatten_results(lines))
}
