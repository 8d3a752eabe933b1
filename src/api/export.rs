// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Export endpoints: summary JSON, BrickLink XML, CSV and the color table.

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::info;

use crate::export::{collect_export, inventory_xml, reviewed_parts_csv, ExportSummary, BRICKLINK_COLORS};

use super::errors::ApiError;
use super::http_server::{require_session, AppState};

/// GET /v1/export - Reviewed parts as an order summary.
pub async fn export_json_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ExportSummary>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let data = session.read().await;
    let summary = collect_export(&data.analyzed);
    info!(
        total = summary.total_parts,
        exported = summary.recognized_parts,
        "export summary built"
    );
    Ok(Json(summary))
}

/// GET /v1/export/bricklink.xml - BrickLink INVENTORY upload document.
pub async fn export_xml_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let session = require_session(&state, &headers).await?;
    let data = session.read().await;
    let summary = collect_export(&data.analyzed);
    let xml = inventory_xml(&summary.parts);
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}

/// GET /v1/export/parts.csv - Reviewed parts with box coordinates.
pub async fn export_csv_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let session = require_session(&state, &headers).await?;
    let data = session.read().await;
    let csv = reviewed_parts_csv(&data.analyzed)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/csv")], csv))
}

/// GET /v1/colors - Static BrickLink color table.
pub async fn colors_handler() -> Json<serde_json::Value> {
    let colors: Vec<_> = BRICKLINK_COLORS
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();
    Json(json!({ "colors": colors }))
}
