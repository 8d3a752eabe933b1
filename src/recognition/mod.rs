// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Part recognition via the Brickognize API.

pub mod batch;
pub mod client;
pub mod types;

pub use batch::{run_batch, AnalysisProgress};
pub use client::{BrickognizeClient, PartRecognizer};
pub use types::{ColorCandidate, PartMatch, RecognitionOutcome};
