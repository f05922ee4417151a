// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Tests for POST /ocr (multipart file upload)

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use image::GenericImageView;
use tower::ServiceExt; // for `oneshot`

use super::mock_engine::{
    app_with, assert_record_shape, json_body, mock_engine, multipart_body, png_bytes,
    sample_lines, BOUNDARY,
};

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ocr")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_returns_flattened_results() {
    let mut engine = mock_engine(false);
    engine
        .expect_ocr()
        .withf(|image| image.dimensions() == (64, 32))
        .times(1)
        .returning(|_| Ok(sample_lines()));
    let app = app_with(engine);

    let body = multipart_body("file", "receipt.png", &png_bytes());
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["filename"], "receipt.png");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    for record in results {
        assert_record_shape(record);
    }

    let texts: Vec<_> = results.iter().map(|r| r["text"].as_str().unwrap()).collect();
    assert_eq!(texts, vec!["Hello", "World", "42"]);
    assert_eq!(results[0]["coordinates"][0], serde_json::json!([4.0, 4.0]));
}

#[tokio::test]
async fn test_upload_no_text_detected() {
    let mut engine = mock_engine(false);
    engine.expect_ocr().times(1).returning(|_| Ok(Vec::new()));
    let app = app_with(engine);

    let body = multipart_body("file", "blank.png", &png_bytes());
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["results"], serde_json::json!([]));
}

#[tokio::test]
async fn test_upload_malformed_image_is_500() {
    let app = app_with(mock_engine(false));

    let body = multipart_body("file", "notes.txt", b"definitely not an image");
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "cannot identify image file");
}

#[tokio::test]
async fn test_upload_truncated_png_is_500() {
    let app = app_with(mock_engine(false));

    let mut png = png_bytes();
    png.truncate(20);
    let body = multipart_body("file", "broken.png", &png);
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Failed to decode image"));
}

#[tokio::test]
async fn test_upload_missing_file_field_is_500() {
    let app = app_with(mock_engine(false));

    let body = multipart_body("attachment", "receipt.png", &png_bytes());
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["detail"].as_str().unwrap().contains("'file'"));
}

#[tokio::test]
async fn test_upload_without_multipart_content_type_is_500() {
    let app = app_with(mock_engine(false));

    let request = Request::builder()
        .method("POST")
        .uri("/ocr")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_upload_engine_failure_is_500_with_message() {
    let mut engine = mock_engine(false);
    engine
        .expect_ocr()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("Detection inference failed")));
    let app = app_with(engine);

    let body = multipart_body("file", "receipt.png", &png_bytes());
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Detection inference failed");
}
