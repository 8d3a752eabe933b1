// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Text-removal endpoint handler

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use crate::api::errors::ApiError;
use crate::api::http_server::{require_session, AppState};
use crate::vision::image_utils::{encode_jpeg_base64, CROP_JPEG_QUALITY};
use crate::vision::remove_quantity_text;

use super::response::RemoveTextResponse;

/// POST /v1/images/{name}/remove-text - Paint quantity annotations out of a
/// stored image
///
/// A detection miss answers success with the original image; only an
/// unknown image name or an encoding fault is an error.
pub async fn remove_text_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<RemoveTextResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let data = session.read().await;
    let stored = data
        .images
        .get(&name)
        .ok_or_else(|| ApiError::NotFound(format!("image '{name}' not found")))?;

    let removal = remove_quantity_text(&stored.image, state.ocr.as_ref(), &state.config.quantity);
    info!(
        image = %name,
        text_found = removal.text_found,
        tokens = removal.detected.len(),
        "text removal complete"
    );

    let image = encode_jpeg_base64(&removal.image, CROP_JPEG_QUALITY)?;
    Ok(Json(RemoveTextResponse {
        success: true,
        text_found: removal.text_found,
        text_removed: removal.text_removed,
        detected: removal.detected,
        image,
        note: removal.note,
    }))
}
