// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Removal of printed quantity annotations from part crops.
//!
//! Locates numeric/`x` tokens with sparse OCR on a contrast-equalized
//! grayscale copy, masks their padded bounding boxes and fills the masked
//! pixels from the surrounding texture. A detection miss is a normal
//! outcome, never an error.

use std::collections::VecDeque;

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::contrast::equalize_histogram;
use tracing::{debug, warn};

use crate::config::QuantityConfig;

use super::ocr::{Charset, OcrEngine, RecognitionMode};
use super::quantity::is_quantity_shape;
use super::types::BoundingBox;

/// One recognized annotation fragment reported back to the caller.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DetectedText {
    pub text: String,
    pub confidence: f32,
}

/// Result of a text-removal pass. `image` is the input when nothing was
/// found or OCR degraded; otherwise a new image with the masked regions
/// filled in.
#[derive(Debug, Clone)]
pub struct TextRemoval {
    pub image: DynamicImage,
    pub text_found: bool,
    pub text_removed: bool,
    pub detected: Vec<DetectedText>,
    pub note: Option<String>,
}

/// Detect quantity annotations in a part crop and paint them out.
pub fn remove_quantity_text(
    image: &DynamicImage,
    engine: &dyn OcrEngine,
    cfg: &QuantityConfig,
) -> TextRemoval {
    let unchanged = |note: Option<String>| TextRemoval {
        image: image.clone(),
        text_found: false,
        text_removed: false,
        detected: Vec::new(),
        note,
    };

    let gray = equalize_histogram(&image.to_luma8());
    let tokens = match engine.recognize_tokens(&gray, RecognitionMode::SparseText, Charset::DigitsAndX)
    {
        Ok(tokens) => tokens,
        Err(err) => {
            warn!(error = %err, "text-removal OCR failed, returning image unchanged");
            return unchanged(Some(format!("OCR failed: {err}")));
        }
    };

    let hits: Vec<_> = tokens
        .iter()
        .filter(|t| t.confidence > cfg.removal_min_confidence && is_quantity_shape(&t.text))
        .collect();
    if hits.is_empty() {
        return unchanged(None);
    }

    let (width, height) = (image.width(), image.height());
    let mut mask = GrayImage::new(width, height);
    for t in &hits {
        let rect = BoundingBox::new(t.left, t.top, t.width.max(1), t.height.max(1))
            .padded(cfg.mask_padding, width, height);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }

    debug!(tokens = hits.len(), "inpainting quantity annotations");
    let filled = inpaint_masked(&image.to_rgb8(), &mask);
    TextRemoval {
        image: DynamicImage::ImageRgb8(filled),
        text_found: true,
        text_removed: true,
        detected: hits
            .iter()
            .map(|t| DetectedText {
                text: t.text.clone(),
                confidence: t.confidence,
            })
            .collect(),
        note: None,
    }
}

/// Fill masked pixels by flooding inward from the mask boundary, each pixel
/// taking the average of its already-filled or unmasked neighbors.
fn inpaint_masked(image: &RgbImage, mask: &GrayImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    let mut known: Vec<bool> = mask.pixels().map(|p| p.0[0] == 0).collect();
    let idx = |x: u32, y: u32| (y * width + x) as usize;

    let mut queue: VecDeque<(u32, u32)> = VecDeque::new();
    let mut queued = vec![false; known.len()];
    for y in 0..height {
        for x in 0..width {
            if !known[idx(x, y)] && has_known_neighbor(&known, width, height, x, y) {
                queue.push_back((x, y));
                queued[idx(x, y)] = true;
            }
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        let mut sum = [0u32; 3];
        let mut count = 0u32;
        for (nx, ny) in neighbors(width, height, x, y) {
            if known[idx(nx, ny)] {
                let p = out.get_pixel(nx, ny).0;
                sum[0] += p[0] as u32;
                sum[1] += p[1] as u32;
                sum[2] += p[2] as u32;
                count += 1;
            }
        }
        if count == 0 {
            // All neighbors still unknown; retry once the front reaches us
            queue.push_back((x, y));
            continue;
        }
        out.put_pixel(
            x,
            y,
            Rgb([
                (sum[0] / count) as u8,
                (sum[1] / count) as u8,
                (sum[2] / count) as u8,
            ]),
        );
        known[idx(x, y)] = true;
        for (nx, ny) in neighbors(width, height, x, y) {
            if !known[idx(nx, ny)] && !queued[idx(nx, ny)] {
                queue.push_back((nx, ny));
                queued[idx(nx, ny)] = true;
            }
        }
    }

    out
}

fn has_known_neighbor(known: &[bool], width: u32, height: u32, x: u32, y: u32) -> bool {
    neighbors(width, height, x, y)
        .into_iter()
        .any(|(nx, ny)| known[(ny * width + nx) as usize])
}

fn neighbors(width: u32, height: u32, x: u32, y: u32) -> Vec<(u32, u32)> {
    let mut out = Vec::with_capacity(8);
    for dy in -1i32..=1 {
        for dx in -1i32..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx >= 0 && ny >= 0 && (nx as u32) < width && (ny as u32) < height {
                out.push((nx as u32, ny as u32));
            }
        }
    }
    out
}
