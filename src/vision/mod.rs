// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Image-side core: box detection, quantity OCR and annotation removal.

pub mod detector;
pub mod image_utils;
pub mod inpaint;
pub mod ocr;
pub mod quantity;
pub mod types;

pub use detector::detect_boxes;
pub use image_utils::{decode_image_bytes, ImageError, ImageInfo};
pub use inpaint::{remove_quantity_text, TextRemoval};
pub use ocr::{OcrEngine, OcrToken, TesseractEngine};
pub use quantity::{crop_quantities, detect_quantity_below, BatchCrop, QuantityDetection};
pub use types::BoundingBox;
