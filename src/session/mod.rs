// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Per-session state: uploaded pages, their box lists and analysis results.
//!
//! Sessions are the only cross-request shared state. Access goes through
//! the [`SessionStore`] trait so the in-memory map can later be swapped for
//! a persistent backend without touching the handlers; each session hands
//! out an `Arc<RwLock<..>>` handle that serializes racing requests on the
//! same session.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::recognition::{AnalysisProgress, RecognitionOutcome};
use crate::vision::types::BoundingBox;

/// One uploaded catalog page with its marked boxes.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub image: DynamicImage,
    pub boxes: Vec<BoundingBox>,
}

/// Manual corrections captured during result review.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartReview {
    pub part_num: Option<String>,
    /// BrickLink color, by id or by name; normalized at export time.
    pub color: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub unknown: bool,
    #[serde(default)]
    pub no_match: bool,
}

/// One analyzed part: the crop that was sent out, where it came from, what
/// the recognizer said and what the reviewer corrected.
#[derive(Debug, Clone)]
pub struct AnalyzedPart {
    pub image_name: String,
    pub bbox: BoundingBox,
    pub crop_jpeg: Vec<u8>,
    pub outcome: RecognitionOutcome,
    pub review: Option<PartReview>,
}

#[derive(Debug)]
pub struct SessionData {
    pub images: HashMap<String, StoredImage>,
    pub analyzed: Vec<AnalyzedPart>,
    /// Set while a batch analysis runs, cleared when it finishes.
    pub progress: Option<AnalysisProgress>,
    /// Token for the current analysis run; replaced on each new run.
    pub cancel: CancellationToken,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new() -> Self {
        Self {
            images: HashMap::new(),
            analyzed: Vec::new(),
            progress: None,
            cancel: CancellationToken::new(),
            created_at: Utc::now(),
        }
    }
}

impl Default for SessionData {
    fn default() -> Self {
        Self::new()
    }
}

pub type SessionHandle = Arc<RwLock<SessionData>>;

/// Storage seam for session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Existing session, or `None`.
    async fn get(&self, id: &str) -> Option<SessionHandle>;

    /// Existing session, or a freshly created empty one.
    async fn get_or_create(&self, id: &str) -> SessionHandle;

    /// Drop a session and everything it holds.
    async fn delete(&self, id: &str);
}

/// Process-local session store. State does not survive a restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn get_or_create(&self, id: &str) -> SessionHandle {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                info!(session = id, "creating session");
                Arc::new(RwLock::new(SessionData::new()))
            })
            .clone()
    }

    async fn delete(&self, id: &str) {
        if self.sessions.write().await.remove(id).is_some() {
            info!(session = id, "session deleted");
        }
    }
}
