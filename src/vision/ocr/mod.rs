// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! OCR engine seam.
//!
//! The quantity pipelines only need two capabilities from an OCR engine: a
//! holistic single-line guess and a per-token list with positions and
//! confidences. Both are behind [`OcrEngine`] so tests can script results
//! and so the service degrades gracefully when no engine is installed.

pub mod engine;

pub use engine::TesseractEngine;

use image::GrayImage;
use thiserror::Error;

/// One recognized text fragment with its pixel-space box.
///
/// Coordinates are relative to the image handed to the engine; callers that
/// upscale before OCR must map them back themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrToken {
    pub text: String,
    /// Engine confidence, 0..100.
    pub confidence: f32,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Page segmentation hint for token recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionMode {
    /// Treat the image as a single text line.
    SingleLine,
    /// Find sparse text anywhere in the image.
    SparseText,
}

/// Character set restriction for recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// Digits plus the multiplier character, for "11x" style annotations.
    DigitsAndX,
    /// No restriction.
    Any,
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine is not available")]
    Unavailable,

    #[error("failed to hand image to the OCR engine: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode image for OCR: {0}")]
    Encode(String),

    #[error("OCR engine failed: {0}")]
    Engine(String),
}

/// Contract for the OCR collaborator.
pub trait OcrEngine: Send + Sync {
    /// Whether the engine can be used at all. Callers treat `false` as
    /// "degrade to null results", never as a fatal condition.
    fn is_available(&self) -> bool;

    /// Holistic single-line recognition.
    fn recognize_line(&self, image: &GrayImage, charset: Charset) -> Result<String, OcrError>;

    /// Per-token recognition with positions and confidences.
    fn recognize_tokens(
        &self,
        image: &GrayImage,
        mode: RecognitionMode,
        charset: Charset,
    ) -> Result<Vec<OcrToken>, OcrError>;
}
