// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! HTTP API surface.

pub mod analyze;
pub mod cleanup;
pub mod detect;
pub mod errors;
pub mod export;
pub mod http_server;
pub mod images;
pub mod quantity;
pub mod results;

pub use errors::{ApiError, ErrorResponse};
pub use http_server::{router, start_server, AppState, SESSION_HEADER};
