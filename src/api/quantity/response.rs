// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Quantity OCR response types

use serde::Serialize;

use crate::vision::types::BoundingBox;

/// Response from a single-box quantity probe
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResponse {
    /// Whether a quantity pattern was recognized
    pub success: bool,
    pub quantity: Option<u32>,
    /// Holistic single-line OCR text, before normalization
    pub raw_text: String,
    /// Text after digit-confusion normalization
    pub cleaned_text: String,
    /// Why nothing was found (region too small, OCR failure, no pattern)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Response from batch quantity cropping
#[derive(Debug, Clone, Serialize)]
pub struct CropQuantitiesResponse {
    pub success: bool,
    /// One box per input box, shrunk where an annotation was excluded
    pub boxes: Vec<BoundingBox>,
    /// How many boxes were actually shrunk
    pub modified: usize,
    pub total: usize,
}
