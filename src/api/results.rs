// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Analysis results and review corrections.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::recognition::ColorCandidate;
use crate::session::PartReview;
use crate::vision::types::BoundingBox;

use super::errors::ApiError;
use super::http_server::{require_session, AppState};

#[derive(Debug, Serialize)]
pub struct ResultEntry {
    pub index: usize,
    pub image_name: String,
    pub recognized: bool,
    /// Crop sent to the recognizer, base64 JPEG for display
    pub crop_image: String,
    pub bbox: BoundingBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<ColorCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<PartReview>,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub results: Vec<ResultEntry>,
}

/// Review corrections for one analyzed part.
#[derive(Debug, Deserialize)]
pub struct UpdatePartRequest {
    pub part_num: Option<String>,
    pub color: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub unknown: bool,
    #[serde(default)]
    pub no_match: bool,
}

fn default_quantity() -> u32 {
    1
}

/// GET /v1/results - Every analyzed part with its crop and match.
pub async fn get_results_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ResultsResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let data = session.read().await;

    let results = data
        .analyzed
        .iter()
        .enumerate()
        .map(|(index, part)| {
            let outcome = &part.outcome;
            let best = outcome.part.as_ref();
            ResultEntry {
                index,
                image_name: part.image_name.clone(),
                recognized: outcome.recognized(),
                crop_image: BASE64.encode(&part.crop_jpeg),
                bbox: part.bbox.clone(),
                part_id: best.map(|m| m.id.clone()),
                part_name: best.map(|m| m.name.clone()),
                confidence: best.map(|m| m.score),
                colors: outcome.colors.clone(),
                api_image_url: best.and_then(|m| m.img_url.clone()),
                error: outcome.error.clone(),
                review: part.review.clone(),
            }
        })
        .collect();

    Ok(Json(ResultsResponse { results }))
}

/// PUT /v1/results/{index} - Record review corrections for one part.
pub async fn update_part_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(index): Path<usize>,
    Json(request): Json<UpdatePartRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let mut data = session.write().await;

    let part = data
        .analyzed
        .get_mut(index)
        .ok_or_else(|| ApiError::NotFound(format!("no analyzed part at index {index}")))?;

    debug!(index, part_num = ?request.part_num, "review update");
    part.review = Some(PartReview {
        part_num: request.part_num,
        color: request.color,
        quantity: request.quantity,
        skip: request.skip,
        unknown: request.unknown,
        no_match: request.no_match,
    });

    Ok(Json(json!({ "success": true })))
}
