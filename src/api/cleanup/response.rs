// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Text-removal response types

use serde::Serialize;

use crate::vision::inpaint::DetectedText;

/// Response from annotation removal
#[derive(Debug, Clone, Serialize)]
pub struct RemoveTextResponse {
    pub success: bool,
    /// Whether any annotation token was detected
    pub text_found: bool,
    /// Whether inpainting was applied
    pub text_removed: bool,
    /// Recognized token texts with confidences
    pub detected: Vec<DetectedText>,
    /// The (possibly cleaned) image as base64 JPEG
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
