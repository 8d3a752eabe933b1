// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Image upload/retrieval and box-list persistence.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::Multipart;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::vision::image_utils::{decode_image_bytes, encode_jpeg, CROP_JPEG_QUALITY};
use crate::vision::types::BoundingBox;

use super::errors::ApiError;
use super::http_server::{require_session, session_id, AppState};
use crate::session::StoredImage;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub uploaded: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SaveBoxesRequest {
    pub boxes: Vec<BoundingBox>,
}

#[derive(Debug, Serialize)]
pub struct BoxesResponse {
    pub boxes: Vec<BoundingBox>,
    pub count: usize,
}

/// POST /v1/images - multipart upload of one or more catalog pages.
///
/// Every part must decode to pixel data; an undecodable payload fails the
/// whole request with 400 before anything is stored.
pub async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut decoded = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field
            .file_name()
            .map(str::to_string)
            .or_else(|| field.name().map(str::to_string))
            .unwrap_or_else(|| format!("upload-{}.png", decoded.len() + 1));
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("failed reading upload: {e}")))?;

        let (image, file_info) = decode_image_bytes(&bytes)?;
        info!(
            name = %name,
            width = file_info.width,
            height = file_info.height,
            "image uploaded"
        );
        decoded.push((name, image));
    }

    if decoded.is_empty() {
        return Err(ApiError::InvalidRequest("no image in upload".to_string()));
    }

    let id = session_id(&headers);
    let session = state.store.get_or_create(&id).await;
    let mut data = session.write().await;
    let mut uploaded = Vec::with_capacity(decoded.len());
    for (name, image) in decoded {
        data.images.insert(
            name.clone(),
            StoredImage {
                image,
                boxes: Vec::new(),
            },
        );
        uploaded.push(name);
    }

    Ok(Json(UploadResponse {
        count: uploaded.len(),
        uploaded,
    }))
}

/// GET /v1/images/{name} - stored page re-encoded as JPEG.
pub async fn get_image_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = require_session(&state, &headers).await?;
    let data = session.read().await;
    let stored = data
        .images
        .get(&name)
        .ok_or_else(|| ApiError::NotFound(format!("image '{name}' not found")))?;

    let jpeg = encode_jpeg(&stored.image, CROP_JPEG_QUALITY)?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], jpeg))
}

/// PUT /v1/images/{name}/boxes - replace the box list for a page.
///
/// Boxes are validated against the image bounds; a single bad box rejects
/// the whole save so the stored list never holds out-of-range coordinates.
pub async fn save_boxes_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Json(request): Json<SaveBoxesRequest>,
) -> Result<Json<BoxesResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let mut data = session.write().await;
    let stored = data
        .images
        .get_mut(&name)
        .ok_or_else(|| ApiError::NotFound(format!("image '{name}' not found")))?;

    let (width, height) = (stored.image.width(), stored.image.height());
    for (idx, bbox) in request.boxes.iter().enumerate() {
        if !bbox.fits_within(width, height) {
            warn!(index = idx, ?bbox, "rejecting out-of-bounds box");
            return Err(ApiError::InvalidRequest(format!(
                "box {idx} does not fit within the {width}x{height} image"
            )));
        }
    }

    stored.boxes = request.boxes;
    Ok(Json(BoxesResponse {
        count: stored.boxes.len(),
        boxes: stored.boxes.clone(),
    }))
}

/// GET /v1/images/{name}/boxes
pub async fn get_boxes_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<BoxesResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let data = session.read().await;
    let stored = data
        .images
        .get(&name)
        .ok_or_else(|| ApiError::NotFound(format!("image '{name}' not found")))?;

    Ok(Json(BoxesResponse {
        boxes: stored.boxes.clone(),
        count: stored.boxes.len(),
    }))
}
