// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! HTTP client for the Brickognize prediction endpoint.
//!
//! The client throttles itself so successive calls are spaced by the
//! configured rate limit, and it never returns `Err`: every failure mode is
//! folded into the outcome's error field so batch callers treat "no match"
//! and "API down" the same way.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::RecognizerConfig;

use super::types::{ColorCandidate, PartMatch, RecognitionOutcome};

/// Seam for the recognition collaborator so handlers and the batch loop can
/// run against a scripted implementation in tests.
#[async_trait]
pub trait PartRecognizer: Send + Sync {
    async fn recognize(&self, jpeg_bytes: Vec<u8>) -> RecognitionOutcome;
}

pub struct BrickognizeClient {
    http: reqwest::Client,
    cfg: RecognizerConfig,
    last_call: Mutex<Option<Instant>>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    items: Vec<PredictItem>,
    #[serde(default)]
    colors: Vec<PredictColor>,
}

#[derive(Debug, Deserialize)]
struct PredictItem {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    score: f32,
    img_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PredictColor {
    name: Option<String>,
    #[serde(default)]
    score: f32,
}

impl BrickognizeClient {
    pub fn new(cfg: RecognizerConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()?;
        Ok(Self {
            http,
            cfg,
            last_call: Mutex::new(None),
        })
    }

    /// Sleep until the configured spacing since the previous call has
    /// elapsed, then record this call's start time.
    async fn throttle(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.cfg.rate_limit {
                tokio::time::sleep(self.cfg.rate_limit - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn parse_response(&self, body: PredictResponse) -> RecognitionOutcome {
        let Some(best) = body.items.into_iter().next() else {
            return RecognitionOutcome::failed("no parts found in response");
        };
        let Some(id) = best.id else {
            return RecognitionOutcome::failed("response item carries no part id");
        };

        RecognitionOutcome {
            part: Some(PartMatch {
                id,
                name: best.name.unwrap_or_else(|| "Unknown Part".to_string()),
                score: best.score,
                img_url: best.img_url,
            }),
            colors: body
                .colors
                .into_iter()
                .filter_map(|c| {
                    c.name.map(|name| ColorCandidate {
                        name,
                        score: c.score,
                    })
                })
                .collect(),
            error: None,
        }
    }
}

#[async_trait]
impl PartRecognizer for BrickognizeClient {
    async fn recognize(&self, jpeg_bytes: Vec<u8>) -> RecognitionOutcome {
        self.throttle().await;

        let part = match Part::bytes(jpeg_bytes)
            .file_name("part.jpg")
            .mime_str("image/jpeg")
        {
            Ok(part) => part,
            Err(err) => return RecognitionOutcome::failed(format!("request build error: {err}")),
        };
        let form = Form::new().part("query_image", part);

        let url = format!("{}/predict/", self.cfg.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .query(&[
                ("external_catalogs", self.cfg.external_catalogs.as_str()),
                (
                    "predict_color",
                    if self.cfg.predict_color { "true" } else { "false" },
                ),
            ])
            .multipart(form)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(err) if err.is_timeout() => {
                warn!("recognition request timed out");
                return RecognitionOutcome::failed("request timeout");
            }
            Err(err) => {
                warn!(error = %err, "recognition request failed");
                return RecognitionOutcome::failed(format!("request error: {err}"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return RecognitionOutcome::failed(format!("API Error: {status} - {snippet}"));
        }

        match response.json::<PredictResponse>().await {
            Ok(body) => {
                let outcome = self.parse_response(body);
                debug!(recognized = outcome.recognized(), "recognition call done");
                outcome
            }
            Err(err) => RecognitionOutcome::failed(format!("error parsing response: {err}")),
        }
    }
}
