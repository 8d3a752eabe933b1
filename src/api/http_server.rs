// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server: shared state, routing and the health endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::recognition::PartRecognizer;
use crate::session::SessionStore;
use crate::vision::OcrEngine;

use super::errors::ApiError;
use super::{analyze, cleanup, detect, export, images, quantity, results};

/// Sessions are addressed by this header; absent means the shared default
/// session, which is enough for a single-user browser flow.
pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub ocr: Arc<dyn OcrEngine>,
    pub recognizer: Arc<dyn PartRecognizer>,
    pub config: Arc<AppConfig>,
}

pub fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("default")
        .to_string()
}

/// Look up the caller's session, failing with 404 when it was never
/// populated. Upload is the only endpoint that creates sessions.
pub(crate) async fn require_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<crate::session::SessionHandle, ApiError> {
    let id = session_id(headers);
    state
        .store
        .get(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no session state for '{id}'")))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/images", post(images::upload_handler))
        .route("/v1/images/:name", get(images::get_image_handler))
        .route(
            "/v1/images/:name/boxes",
            put(images::save_boxes_handler).get(images::get_boxes_handler),
        )
        .route("/v1/images/:name/detect", post(detect::detect_handler))
        .route("/v1/quantity/probe", post(quantity::probe_handler))
        .route(
            "/v1/images/:name/boxes/crop-quantities",
            post(quantity::crop_handler),
        )
        .route(
            "/v1/images/:name/remove-text",
            post(cleanup::remove_text_handler),
        )
        .route("/v1/analyze", post(analyze::analyze_handler))
        .route("/v1/analyze/progress", get(analyze::progress_handler))
        .route("/v1/analyze/cancel", post(analyze::cancel_handler))
        .route("/v1/results", get(results::get_results_handler))
        .route("/v1/results/:index", put(results::update_part_handler))
        .route("/v1/export", get(export::export_json_handler))
        .route("/v1/export/bricklink.xml", get(export::export_xml_handler))
        .route("/v1/export/parts.csv", get(export::export_csv_handler))
        .route("/v1/colors", get(export::colors_handler))
        .route("/v1/session", get(session_info_handler))
        .route("/v1/session/reset", post(reset_session_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// GET /health - liveness plus OCR availability.
///
/// A missing OCR engine is reported here but never fails the check; the
/// service still detects boxes and recognizes parts without it.
async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "ocr_available": state.ocr.is_available(),
    }))
}

/// GET /v1/session - summary of the caller's session state.
///
/// Mainly for the browser client to decide whether it is resuming work or
/// starting fresh; a session that was never populated reports `exists: false`.
async fn session_info_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let id = session_id(&headers);
    match state.store.get(&id).await {
        None => Json(json!({ "exists": false })),
        Some(session) => {
            let data = session.read().await;
            Json(json!({
                "exists": true,
                "images": data.images.len(),
                "analyzed": data.analyzed.len(),
                "created_at": data.created_at.to_rfc3339(),
            }))
        }
    }
}

/// POST /v1/session/reset - drop all state for the caller's session.
///
/// Returns a fresh session id; the client adopts it for subsequent
/// requests so stale browser tabs cannot resurrect the old state.
async fn reset_session_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = session_id(&headers);
    state.store.delete(&id).await;
    let next = uuid::Uuid::new_v4().to_string();
    Ok(Json(json!({ "success": true, "session_id": next })))
}
