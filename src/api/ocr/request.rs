// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR request types

use serde_json::Value;

use crate::api::errors::ApiError;

pub const MISSING_IMAGE_DETAIL: &str = "No image data provided";

/// Body of `POST /ocr/base64`: `{"image": "<base64>"}`
#[derive(Debug, Clone, PartialEq)]
pub struct OcrBase64Request {
    pub image: String,
}

impl OcrBase64Request {
    /// Parse a raw request body.
    ///
    /// A body without an `image` key (including a JSON value that is not an
    /// object) is a 400; an unparsable body or a non-string `image` is a 500
    /// like every other processing failure.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).map_err(ApiError::internal)?;

        let image = value
            .as_object()
            .and_then(|object| object.get("image"))
            .ok_or_else(|| ApiError::BadRequest(MISSING_IMAGE_DETAIL.to_string()))?;

        match image {
            Value::String(image) => Ok(Self {
                image: image.clone(),
            }),
            other => Err(ApiError::Internal(format!(
                "image must be a base64 string, got {}",
                json_type_name(other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
