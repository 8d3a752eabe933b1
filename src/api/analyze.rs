// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Batch part analysis: run recognition over every marked box.
//!
//! The loop itself is sequential and throttled by the recognition client;
//! this module wires it to the session: crops are gathered up front so the
//! session lock is not held across network calls, progress snapshots are
//! written back into the session between parts, and the cancel endpoint
//! flips the token checked between parts.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::recognition::{run_batch, AnalysisProgress, RecognitionOutcome};
use crate::session::AnalyzedPart;
use crate::vision::image_utils::{crop_box, encode_jpeg, CROP_JPEG_QUALITY};
use crate::vision::types::BoundingBox;
use crate::vision::ImageError;

use super::errors::ApiError;
use super::http_server::{require_session, AppState};

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub total: usize,
    pub recognized: usize,
    pub failed: usize,
}

/// One box queued for recognition. An encode failure is carried along so
/// the part still gets a result entry instead of aborting the run.
struct CropJob {
    image_name: String,
    bbox: BoundingBox,
    jpeg: Result<Vec<u8>, ImageError>,
}

/// POST /v1/analyze - Recognize every marked part in the session
///
/// Replaces any previous results. Per-part failures, whether a crop that
/// would not encode or an API error, are recorded in that part's outcome;
/// the summary still covers every box.
pub async fn analyze_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;

    // Gather crops and reset run state under one write lock so the lock is
    // released before any network call goes out.
    let (jobs, cancel) = {
        let mut data = session.write().await;
        let mut jobs: Vec<CropJob> = Vec::new();
        let mut names: Vec<&String> = data.images.keys().collect();
        names.sort();
        for name in names {
            let stored = &data.images[name];
            for bbox in &stored.boxes {
                let crop = crop_box(&stored.image, bbox);
                let jpeg = encode_jpeg(&crop, CROP_JPEG_QUALITY);
                if let Err(err) = &jpeg {
                    warn!(image = %name, error = %err, "crop failed to encode");
                }
                jobs.push(CropJob {
                    image_name: name.clone(),
                    bbox: bbox.clone(),
                    jpeg,
                });
            }
        }

        data.analyzed.clear();
        data.progress = Some(AnalysisProgress::at(0, jobs.len()));
        data.cancel = tokio_util::sync::CancellationToken::new();
        (jobs, data.cancel.clone())
    };

    let total = jobs.len();
    info!(total, "starting part analysis");

    let crops: Vec<Vec<u8>> = jobs
        .iter()
        .filter_map(|job| job.jpeg.as_ref().ok().cloned())
        .collect();
    // Publishing is awaited between parts, so every snapshot lands before
    // the final clear below; nothing races the end of the run.
    let outcomes = run_batch(state.recognizer.as_ref(), crops, &cancel, |p| {
        let handle = session.clone();
        async move {
            handle.write().await.progress = Some(p);
        }
    })
    .await;

    let analyzed = merge_outcomes(jobs, outcomes);
    let recognized = analyzed.iter().filter(|p| p.outcome.recognized()).count();
    {
        let mut data = session.write().await;
        data.analyzed = analyzed;
        data.progress = None;
    }

    info!(total, recognized, "part analysis complete");
    Ok(Json(AnalyzeResponse {
        success: true,
        total,
        recognized,
        failed: total - recognized,
    }))
}

/// Pair each job with its outcome. Jobs whose crop never encoded did not go
/// out and get an error-carrying outcome; the rest consume the recognizer's
/// outcomes in order.
fn merge_outcomes(jobs: Vec<CropJob>, outcomes: Vec<RecognitionOutcome>) -> Vec<AnalyzedPart> {
    let mut outcomes = outcomes.into_iter();
    jobs.into_iter()
        .map(|job| {
            let (crop_jpeg, outcome) = match job.jpeg {
                Ok(jpeg) => (
                    jpeg,
                    outcomes
                        .next()
                        .unwrap_or_else(|| RecognitionOutcome::failed("no outcome for part")),
                ),
                Err(err) => (
                    Vec::new(),
                    RecognitionOutcome::failed(format!("crop encoding failed: {err}")),
                ),
            };
            AnalyzedPart {
                image_name: job.image_name,
                bbox: job.bbox,
                crop_jpeg,
                outcome,
                review: None,
            }
        })
        .collect()
}

/// GET /v1/analyze/progress - Progress of the current run, or zeroes.
pub async fn progress_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnalysisProgress>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let progress = session.read().await.progress.clone().unwrap_or_default();
    Ok(Json(progress))
}

/// POST /v1/analyze/cancel - Stop dispatching further recognition calls.
///
/// Cooperative: the part currently in flight still completes.
pub async fn cancel_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = require_session(&state, &headers).await?;
    session.read().await.cancel.cancel();
    info!("analysis cancellation requested");
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::PartMatch;

    fn job(name: &str, jpeg: Result<Vec<u8>, ImageError>) -> CropJob {
        CropJob {
            image_name: name.to_string(),
            bbox: BoundingBox::new(0, 0, 10, 10),
            jpeg,
        }
    }

    fn matched(id: &str) -> RecognitionOutcome {
        RecognitionOutcome {
            part: Some(PartMatch {
                id: id.to_string(),
                name: "Plate 2 x 2".to_string(),
                score: 0.9,
                img_url: None,
            }),
            colors: Vec::new(),
            error: None,
        }
    }

    #[test]
    fn encode_failure_becomes_error_outcome_not_abort() {
        let jobs = vec![
            job("page1.png", Ok(vec![1, 2, 3])),
            job(
                "page1.png",
                Err(ImageError::EncodeFailed("disk full".to_string())),
            ),
            job("page2.png", Ok(vec![4, 5])),
        ];
        // Only the two encodable crops went out to the recognizer
        let analyzed = merge_outcomes(jobs, vec![matched("3022"), matched("3001")]);

        assert_eq!(analyzed.len(), 3);
        assert!(analyzed[0].outcome.recognized());
        assert_eq!(
            analyzed[0].outcome.part.as_ref().map(|p| p.id.as_str()),
            Some("3022")
        );

        assert!(!analyzed[1].outcome.recognized());
        assert!(analyzed[1]
            .outcome
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("crop encoding failed")));
        assert!(analyzed[1].crop_jpeg.is_empty());

        // The failed middle job did not shift its sibling's outcome
        assert_eq!(
            analyzed[2].outcome.part.as_ref().map(|p| p.id.as_str()),
            Some("3001")
        );
    }

    #[test]
    fn every_job_gets_an_outcome_even_when_short() {
        let jobs = vec![job("page1.png", Ok(vec![1])), job("page1.png", Ok(vec![2]))];
        let analyzed = merge_outcomes(jobs, vec![matched("3022")]);
        assert_eq!(analyzed.len(), 2);
        assert!(!analyzed[1].outcome.recognized());
    }
}
