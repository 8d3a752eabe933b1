// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Quantity OCR endpoint module
//!
//! Provides POST /v1/quantity/probe (strip below a single box) and
//! POST /v1/images/{name}/boxes/crop-quantities (batch bottom-of-box crop).

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{crop_handler, probe_handler};
pub use request::ProbeRequest;
pub use response::{CropQuantitiesResponse, ProbeResponse};
