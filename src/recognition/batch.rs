// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Sequential recognition over a batch of part crops.
//!
//! Calls the recognizer one crop at a time (the client spaces the calls),
//! reports progress after each, and honors cooperative cancellation: the
//! token is checked between calls, never mid-call.

use std::future::Future;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::client::PartRecognizer;
use super::types::RecognitionOutcome;

/// Progress snapshot published while a batch run is in flight.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisProgress {
    pub current: usize,
    pub total: usize,
    pub percentage: u8,
}

impl AnalysisProgress {
    pub fn at(current: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            ((current * 100) / total) as u8
        };
        Self {
            current,
            total,
            percentage,
        }
    }
}

/// Recognize every crop in order, returning exactly one outcome per crop.
///
/// A per-part API failure is recorded in that part's outcome and the loop
/// moves on. Once the token is cancelled, remaining parts get a "cancelled"
/// outcome without any further dispatch.
///
/// `on_progress` is awaited after each part, so a snapshot published by it
/// is fully visible before the loop moves on. No snapshot outlives the call.
pub async fn run_batch<F, Fut>(
    recognizer: &dyn PartRecognizer,
    crops: Vec<Vec<u8>>,
    cancel: &CancellationToken,
    mut on_progress: F,
) -> Vec<RecognitionOutcome>
where
    F: FnMut(AnalysisProgress) -> Fut,
    Fut: Future<Output = ()>,
{
    let total = crops.len();
    let mut outcomes = Vec::with_capacity(total);

    for (idx, crop) in crops.into_iter().enumerate() {
        if cancel.is_cancelled() {
            info!(done = idx, total, "analysis cancelled, skipping remaining parts");
            outcomes.push(RecognitionOutcome::failed("analysis cancelled"));
            continue;
        }
        let outcome = recognizer.recognize(crop).await;
        outcomes.push(outcome);
        on_progress(AnalysisProgress::at(idx + 1, total)).await;
    }

    outcomes
}
