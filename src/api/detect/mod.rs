// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Box detection endpoint module
//!
//! Provides POST /v1/images/{name}/detect for automatic part-box detection.

pub mod handler;
pub mod response;

pub use handler::detect_handler;
pub use response::DetectResponse;
