// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Mocked OCR engine and request helpers shared by the API tests

#![allow(dead_code)]

use axum::{body::Body, http::Response, Router};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use mockall::mock;
use paddleocr_service::{create_app, AppState, OcrEngine, OcrLine, OcrWord};
use std::io::Cursor;
use std::sync::Arc;

mock! {
    pub Engine {}

    impl OcrEngine for Engine {
        fn ocr(&self, image: &DynamicImage) -> anyhow::Result<Vec<OcrLine>>;
        fn uses_gpu(&self) -> bool;
    }
}

pub const BOUNDARY: &str = "----paddleocr-test-boundary";

/// Mock engine that only answers `uses_gpu`; tests add `ocr` expectations
pub fn mock_engine(gpu: bool) -> MockEngine {
    let mut engine = MockEngine::new();
    engine.expect_uses_gpu().return_const(gpu);
    engine
}

pub fn app_with(engine: MockEngine) -> Router {
    create_app(AppState::new(Arc::new(engine)))
}

fn word(text: &str, confidence: f32, x: f32, y: f32) -> OcrWord {
    OcrWord {
        coordinates: [[x, y], [x + 40.0, y], [x + 40.0, y + 12.0], [x, y + 12.0]],
        text: text.to_string(),
        confidence,
    }
}

/// Two lines, three words
pub fn sample_lines() -> Vec<OcrLine> {
    vec![
        OcrLine::new(vec![word("Hello", 0.98, 4.0, 4.0), word("World", 0.93, 50.0, 4.0)]),
        OcrLine::new(vec![word("42", 0.81, 4.0, 30.0)]),
    ]
}

/// A 64x32 white PNG
pub fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 32, Rgb([255, 255, 255])));
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("encode png");
    cursor.into_inner()
}

/// Build a multipart body with a single file field
pub fn multipart_body(field: &str, filename: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("response is JSON")
}

/// Every record must carry text, a confidence in [0, 1] and four points
pub fn assert_record_shape(record: &serde_json::Value) {
    assert!(record["text"].is_string(), "text missing: {}", record);
    let confidence = record["confidence"].as_f64().expect("confidence is a number");
    assert!((0.0..=1.0).contains(&confidence));
    let coordinates = record["coordinates"].as_array().expect("coordinates array");
    assert_eq!(coordinates.len(), 4);
    for point in coordinates {
        let point = point.as_array().expect("point is [x, y]");
        assert_eq!(point.len(), 2);
        assert!(point.iter().all(|v| v.is_number()));
    }
}
