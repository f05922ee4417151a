// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Tests for POST /ocr/base64

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use paddleocr_service::{create_app, AppState};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use super::mock_engine::{
    app_with, assert_record_shape, json_body, mock_engine, png_bytes, sample_lines,
};

fn base64_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ocr/base64")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn image_payload(image: &str) -> String {
    serde_json::json!({ "image": image }).to_string()
}

#[tokio::test]
async fn test_base64_returns_results() {
    let mut engine = mock_engine(false);
    engine
        .expect_ocr()
        .times(1)
        .returning(|_| Ok(sample_lines()));
    let app = app_with(engine);

    let payload = image_payload(&STANDARD.encode(png_bytes()));
    let response = app.oneshot(base64_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body.get("filename").is_none());

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    for record in results {
        assert_record_shape(record);
    }
    assert_eq!(results[2]["text"], "42");
}

#[tokio::test]
async fn test_base64_data_url_accepted() {
    let mut engine = mock_engine(false);
    engine.expect_ocr().times(1).returning(|_| Ok(Vec::new()));
    let app = app_with(engine);

    let data_url = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes()));
    let response = app
        .oneshot(base64_request(image_payload(&data_url)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_base64_missing_image_is_400() {
    let app = app_with(mock_engine(false));

    let response = app
        .oneshot(base64_request(r#"{"picture": "abc"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "No image data provided");
}

#[tokio::test]
async fn test_base64_empty_object_is_400() {
    let app = app_with(mock_engine(false));

    let response = app.oneshot(base64_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_base64_invalid_encoding_is_500() {
    let app = app_with(mock_engine(false));

    let response = app
        .oneshot(base64_request(image_payload("%%% not base64 %%%")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Invalid base64 encoding"));
}

#[tokio::test]
async fn test_base64_malformed_image_is_500() {
    let app = app_with(mock_engine(false));

    let payload = image_payload(&STANDARD.encode(b"plain text, not pixels"));
    let response = app.oneshot(base64_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "cannot identify image file");
}

#[tokio::test]
async fn test_base64_empty_image_is_500() {
    let app = app_with(mock_engine(false));

    let response = app.oneshot(base64_request(image_payload(""))).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_base64_invalid_json_is_500() {
    let app = app_with(mock_engine(false));

    let response = app.oneshot(base64_request("{\"image\": ")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_base64_engine_failure_is_500() {
    let mut engine = mock_engine(false);
    engine
        .expect_ocr()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("Recognition inference failed")));
    let app = app_with(engine);

    let payload = image_payload(&STANDARD.encode(png_bytes()));
    let response = app.oneshot(base64_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Recognition inference failed");
}

#[tokio::test]
async fn test_base64_oversized_body_is_500() {
    let state = AppState::new(Arc::new(mock_engine(false))).with_max_body_bytes(1024);
    let app = create_app(state);

    let payload = image_payload(&"A".repeat(4096));
    let response = app.oneshot(base64_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_base64_line_wrapped_payload() {
    let mut engine = mock_engine(false);
    engine.expect_ocr().times(1).returning(|_| Ok(sample_lines()));
    let app = app_with(engine);

    let encoded = STANDARD.encode(png_bytes());
    let wrapped = encoded
        .as_bytes()
        .chunks(76)
        .map(|chunk| std::str::from_utf8(chunk).unwrap())
        .collect::<Vec<_>>()
        .join("\n");
    let response = app.oneshot(base64_request(image_payload(&wrapped))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
}
