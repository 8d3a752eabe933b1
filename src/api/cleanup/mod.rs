// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Text-removal endpoint module
//!
//! Provides POST /v1/images/{name}/remove-text for painting quantity
//! annotations out of a stored image.

pub mod handler;
pub mod response;

pub use handler::remove_text_handler;
pub use response::RemoveTextResponse;
