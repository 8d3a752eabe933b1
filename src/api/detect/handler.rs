// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Box detection endpoint handler

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use crate::api::errors::ApiError;
use crate::api::http_server::{require_session, AppState};
use crate::vision::detect_boxes;

use super::response::DetectResponse;

/// POST /v1/images/{name}/detect - Detect part boxes on a stored page
///
/// Runs the contour-based detector over the stored image and replaces the
/// page's box list with the result. An empty page yields `count: 0` rather
/// than an error.
pub async fn detect_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<DetectResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let mut data = session.write().await;
    let stored = data
        .images
        .get_mut(&name)
        .ok_or_else(|| ApiError::NotFound(format!("image '{name}' not found")))?;

    let boxes = detect_boxes(&stored.image, &state.config.detector);
    info!(image = %name, count = boxes.len(), "auto-detected boxes");
    stored.boxes = boxes.clone();

    Ok(Json(DetectResponse {
        count: boxes.len(),
        boxes,
    }))
}
