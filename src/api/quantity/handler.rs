// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Quantity OCR endpoint handlers

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use crate::api::errors::ApiError;
use crate::api::http_server::{require_session, AppState};
use crate::vision::{crop_quantities, detect_quantity_below};

use super::request::ProbeRequest;
use super::response::{CropQuantitiesResponse, ProbeResponse};

/// POST /v1/quantity/probe - Read the quantity printed below one box
///
/// A missing quantity, a too-small strip below the box and an unavailable
/// OCR engine all answer 200 with `success: false` and a note; only an
/// unknown image or an out-of-bounds box is a client error.
pub async fn probe_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ProbeRequest>,
) -> Result<Json<ProbeResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let data = session.read().await;
    let stored = data
        .images
        .get(&request.image)
        .ok_or_else(|| ApiError::NotFound(format!("image '{}' not found", request.image)))?;
    request.validate(stored.image.width(), stored.image.height())?;

    let detection = detect_quantity_below(
        &stored.image,
        &request.bbox,
        state.ocr.as_ref(),
        &state.config.quantity,
    );

    Ok(Json(ProbeResponse {
        success: detection.found,
        quantity: detection.quantity,
        raw_text: detection.raw_text,
        cleaned_text: detection.cleaned_text,
        note: detection.note,
    }))
}

/// POST /v1/images/{name}/boxes/crop-quantities - Shrink saved boxes around
/// their quantity annotations
///
/// Runs the bottom-of-box variant over every saved box and persists the
/// adjusted list. Per-box failures leave that box unchanged; the response
/// always covers every box.
pub async fn crop_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<CropQuantitiesResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let mut data = session.write().await;
    let stored = data
        .images
        .get_mut(&name)
        .ok_or_else(|| ApiError::NotFound(format!("image '{name}' not found")))?;

    let batch = crop_quantities(
        &stored.image,
        &stored.boxes,
        state.ocr.as_ref(),
        &state.config.quantity,
    );
    info!(
        image = %name,
        modified = batch.modified,
        total = batch.total,
        "quantity crop complete"
    );

    let boxes: Vec<_> = batch.boxes.into_iter().map(|c| c.bbox).collect();
    stored.boxes = boxes.clone();

    Ok(Json(CropQuantitiesResponse {
        success: true,
        boxes,
        modified: batch.modified,
        total: batch.total,
    }))
}
