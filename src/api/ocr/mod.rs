// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR API endpoints
//!
//! Provides POST /ocr (multipart upload) and POST /ocr/base64 (JSON).

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{ocr_base64_handler, ocr_upload_handler};
pub use request::OcrBase64Request;
pub use response::{flatten_results, OcrBase64Response, OcrRecord, OcrUploadResponse};
