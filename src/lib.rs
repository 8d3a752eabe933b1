// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod export;
pub mod recognition;
pub mod session;
pub mod vision;

pub use api::{router, start_server, AppState};
pub use config::AppConfig;
pub use recognition::{BrickognizeClient, PartRecognizer, RecognitionOutcome};
pub use session::{InMemorySessionStore, SessionStore};
pub use vision::{detect_boxes, BoundingBox, OcrEngine, TesseractEngine};
