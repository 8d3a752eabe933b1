// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Quantity probe request types and validation

use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::vision::types::BoundingBox;

/// Request for a single-box quantity probe
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeRequest {
    /// Name of a stored page image
    pub image: String,
    /// Box whose below-strip should be inspected
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl ProbeRequest {
    pub fn validate(&self, image_width: u32, image_height: u32) -> Result<(), ApiError> {
        if !self.bbox.fits_within(image_width, image_height) {
            return Err(ApiError::InvalidRequest(format!(
                "box does not fit within the {image_width}x{image_height} image"
            )));
        }
        Ok(())
    }
}
