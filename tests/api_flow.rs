// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end API flow over the in-memory state with scripted OCR and
//! recognition collaborators.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use brickscan_node::api::{router, AppState};
use brickscan_node::config::AppConfig;
use brickscan_node::recognition::{ColorCandidate, PartMatch, PartRecognizer, RecognitionOutcome};
use brickscan_node::session::InMemorySessionStore;
use brickscan_node::vision::ocr::{Charset, OcrError, OcrToken, RecognitionMode};
use brickscan_node::vision::OcrEngine;
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

struct FakeOcr {
    line: String,
    tokens: Vec<OcrToken>,
}

impl FakeOcr {
    fn reading(line: &str) -> Self {
        Self {
            line: line.to_string(),
            tokens: vec![OcrToken {
                text: line.to_string(),
                confidence: 90.0,
                left: 10,
                top: 12,
                width: 30,
                height: 14,
            }],
        }
    }
}

impl OcrEngine for FakeOcr {
    fn is_available(&self) -> bool {
        true
    }

    fn recognize_line(&self, _image: &GrayImage, _charset: Charset) -> Result<String, OcrError> {
        Ok(self.line.clone())
    }

    fn recognize_tokens(
        &self,
        _image: &GrayImage,
        _mode: RecognitionMode,
        _charset: Charset,
    ) -> Result<Vec<OcrToken>, OcrError> {
        Ok(self.tokens.clone())
    }
}

struct FakeRecognizer;

#[async_trait]
impl PartRecognizer for FakeRecognizer {
    async fn recognize(&self, _jpeg_bytes: Vec<u8>) -> RecognitionOutcome {
        RecognitionOutcome {
            part: Some(PartMatch {
                id: "3022".to_string(),
                name: "Plate 2 x 2".to_string(),
                score: 0.92,
                img_url: None,
            }),
            colors: vec![ColorCandidate {
                name: "Black".to_string(),
                score: 0.81,
            }],
            error: None,
        }
    }
}

fn test_app() -> Router {
    let state = AppState {
        store: Arc::new(InMemorySessionStore::new()),
        ocr: Arc::new(FakeOcr::reading("11x")),
        recognizer: Arc::new(FakeRecognizer),
        config: Arc::new(AppConfig::default()),
    };
    router(state)
}

/// White page with two part-sized dark rectangles.
fn page_png() -> Vec<u8> {
    let mut img = RgbImage::from_pixel(500, 400, Rgb([250, 250, 250]));
    for &(x, y, w, h) in &[(60u32, 60u32, 90u32, 70u32), (300u32, 220u32, 80u32, 60u32)] {
        for yy in y..y + h {
            for xx in x..x + w {
                img.put_pixel(xx, yy, Rgb([15, 15, 15]));
            }
        }
    }
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

const BOUNDARY: &str = "brickscan-test-boundary";

fn multipart_upload(filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/v1/images")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ocr_availability() {
    let app = test_app();
    let (status, body) = send_json(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ocr_available"], true);
}

#[tokio::test]
async fn upload_detect_probe_flow() {
    let app = test_app();

    let (status, body) = send_json(&app, multipart_upload("page1.png", &page_png())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["uploaded"][0], "page1.png");

    let (status, body) = send_json(&app, post_empty("/v1/images/page1.png/detect")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    // Strip below the first detected box reads "11x" through the fake OCR
    let bbox = body["boxes"][0].clone();
    let (status, body) = send_json(
        &app,
        json_request(
            Method::POST,
            "/v1/quantity/probe",
            json!({ "image": "page1.png", "box": bbox }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["quantity"], 11);
}

#[tokio::test]
async fn undecodable_upload_is_rejected() {
    let app = test_app();
    let (status, body) = send_json(&app, multipart_upload("junk.png", b"not an image")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "unreadable_image");
}

#[tokio::test]
async fn out_of_bounds_boxes_are_rejected_on_save() {
    let app = test_app();
    send_json(&app, multipart_upload("page1.png", &page_png())).await;

    let (status, body) = send_json(
        &app,
        json_request(
            Method::PUT,
            "/v1/images/page1.png/boxes",
            json!({ "boxes": [{ "x": 480, "y": 10, "width": 100, "height": 50 }] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_request");

    // Nothing was stored
    let (status, body) = send_json(&app, get("/v1/images/page1.png/boxes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn unknown_image_and_missing_session_are_404() {
    let app = test_app();
    let (status, _) = send_json(&app, get("/v1/images/nope.png/boxes")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send_json(&app, multipart_upload("page1.png", &page_png())).await;
    let (status, body) = send_json(&app, get("/v1/images/nope.png/boxes")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_type"], "not_found");
}

#[tokio::test]
async fn analyze_review_export_flow() {
    let app = test_app();
    send_json(&app, multipart_upload("page1.png", &page_png())).await;
    send_json(&app, post_empty("/v1/images/page1.png/detect")).await;

    let (status, body) = send_json(&app, post_empty("/v1/analyze")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 2);
    assert_eq!(body["recognized"], 2);
    assert_eq!(body["failed"], 0);

    // Progress is cleared once the run finishes
    let (_, progress) = send_json(&app, get("/v1/analyze/progress")).await;
    assert_eq!(progress["current"], 0);
    assert_eq!(progress["total"], 0);

    let (status, body) = send_json(&app, get("/v1/results")).await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["part_id"], "3022");
    assert_eq!(results[0]["recognized"], true);
    assert!(!results[0]["crop_image"].as_str().unwrap().is_empty());

    // Review both parts: accept one, skip the other
    let (status, _) = send_json(
        &app,
        json_request(
            Method::PUT,
            "/v1/results/0",
            json!({ "part_num": "3022", "color": "Black", "quantity": 4 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_json(
        &app,
        json_request(Method::PUT, "/v1/results/1", json!({ "skip": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        json_request(Method::PUT, "/v1/results/9", json!({ "skip": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(&app, get("/v1/export")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalParts"], 2);
    assert_eq!(body["recognizedParts"], 1);
    assert_eq!(body["skippedCount"], 1);
    assert_eq!(body["parts"][0]["partNum"], "3022");
    assert_eq!(body["parts"][0]["colorId"], "11");

    let response = app
        .clone()
        .oneshot(get("/v1/export/bricklink.xml"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let xml = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let xml = String::from_utf8(xml.to_vec()).unwrap();
    assert!(xml.contains("<ITEMID>3022</ITEMID>"));
    assert!(xml.contains("<MINQTY>4</MINQTY>"));

    let response = app
        .clone()
        .oneshot(get("/v1/export/parts.csv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let csv = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let csv = String::from_utf8(csv.to_vec()).unwrap();
    assert!(csv.lines().next().unwrap().starts_with("part_num,"));
    assert!(csv.contains("3022,Plate 2 x 2,Black,4"));
}

#[tokio::test]
async fn progress_is_cleared_once_analysis_finishes() {
    let app = test_app();
    send_json(&app, multipart_upload("page1.png", &page_png())).await;
    send_json(&app, post_empty("/v1/images/page1.png/detect")).await;

    let (status, body) = send_json(&app, post_empty("/v1/analyze")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    // Give any stray writer a chance to run before polling; the final
    // snapshot must not outlive the run.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    let (status, progress) = send_json(&app, get("/v1/analyze/progress")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["current"], 0, "stale progress: {progress}");
    assert_eq!(progress["total"], 0);
    assert_eq!(progress["percentage"], 0);
}

#[tokio::test]
async fn session_info_reports_state_and_age() {
    let app = test_app();

    let (status, body) = send_json(&app, get("/v1/session")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], false);

    send_json(&app, multipart_upload("page1.png", &page_png())).await;
    let (status, body) = send_json(&app, get("/v1/session")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], true);
    assert_eq!(body["images"], 1);
    assert_eq!(body["analyzed"], 0);
    assert!(!body["created_at"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn colors_table_is_served() {
    let app = test_app();
    let (status, body) = send_json(&app, get("/v1/colors")).await;
    assert_eq!(status, StatusCode::OK);
    let colors = body["colors"].as_array().unwrap();
    assert!(colors.len() > 150);
    assert!(colors
        .iter()
        .any(|c| c["id"] == 11 && c["name"] == "Black"));
}

#[tokio::test]
async fn session_reset_clears_state() {
    let app = test_app();
    send_json(&app, multipart_upload("page1.png", &page_png())).await;

    let (status, body) = send_json(&app, post_empty("/v1/session/reset")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send_json(&app, get("/v1/images/page1.png/boxes")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
