// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Box detection response types

use serde::Serialize;

use crate::vision::types::BoundingBox;

/// Response from automatic box detection
#[derive(Debug, Clone, Serialize)]
pub struct DetectResponse {
    /// Detected boxes in reading order (top-to-bottom, left-to-right)
    pub boxes: Vec<BoundingBox>,
    pub count: usize,
}
