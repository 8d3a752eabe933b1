// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Recognition result types.
//!
//! Failures are carried as data rather than errors so "no match" and "API
//! unreachable" flow through a batch uniformly without aborting it.

use serde::{Deserialize, Serialize};

/// Best catalog match for one part crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartMatch {
    /// Catalog part id, e.g. "3022". Doubles as the BrickLink id.
    pub id: String,
    pub name: String,
    /// Match confidence in 0..1.
    pub score: f32,
    /// Reference image for the matched part, when the API provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
}

/// One predicted color with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorCandidate {
    pub name: String,
    pub score: f32,
}

/// Outcome of one recognition call. Exactly one of `part` or `error` is
/// expected to be set; both absent means the API answered with no items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecognitionOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<PartMatch>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<ColorCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecognitionOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn recognized(&self) -> bool {
        self.part.is_some() && self.error.is_none()
    }

    /// Highest-scoring predicted color name, if any.
    pub fn best_color(&self) -> Option<&str> {
        self.colors
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .map(|c| c.name.as_str())
    }
}
