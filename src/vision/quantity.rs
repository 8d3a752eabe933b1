// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Quantity extraction from printed "Nx" annotations.
//!
//! Two region variants share one OCR pipeline: the strip directly below a
//! box (probe variant) and the bottom portion of the box interior (crop
//! variant, which can also shrink the box to exclude the annotation). Every
//! per-box failure degrades to a null result so batch calls always return
//! one entry per input box.

use std::sync::OnceLock;

use image::{imageops::FilterType, DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use regex::Regex;
use tracing::{debug, warn};

use crate::config::QuantityConfig;

use super::image_utils::crop_box;
use super::ocr::{Charset, OcrEngine, OcrToken, RecognitionMode};
use super::types::BoundingBox;

/// Outcome of a single quantity probe. Transient, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityDetection {
    pub found: bool,
    pub quantity: Option<u32>,
    pub raw_text: String,
    pub cleaned_text: String,
    pub note: Option<String>,
}

impl QuantityDetection {
    fn not_found(note: impl Into<String>) -> Self {
        Self {
            found: false,
            quantity: None,
            raw_text: String::new(),
            cleaned_text: String::new(),
            note: Some(note.into()),
        }
    }
}

/// One box after quantity cropping. `modified` is false when the box came
/// back unchanged, whether because no annotation was found or because the
/// computed shrink was rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct CroppedBox {
    pub bbox: BoundingBox,
    pub modified: bool,
    pub note: Option<String>,
}

/// Batch crop summary, one entry per input box in input order.
#[derive(Debug, Clone)]
pub struct BatchCrop {
    pub boxes: Vec<CroppedBox>,
    pub modified: usize,
    pub total: usize,
}

/// Probe the strip directly below `bbox` for a printed quantity.
///
/// The strip is half the box height, clamped to the image. A strip shorter
/// than the configured minimum is a null result, not an error; so is an OCR
/// engine failure.
pub fn detect_quantity_below(
    image: &DynamicImage,
    bbox: &BoundingBox,
    engine: &dyn OcrEngine,
    cfg: &QuantityConfig,
) -> QuantityDetection {
    let strip_top = bbox.bottom().min(image.height());
    let wanted = (bbox.height as f32 * cfg.strip_height_ratio) as u32;
    let strip_height = wanted.min(image.height().saturating_sub(strip_top));
    if strip_height < cfg.min_strip_height {
        return QuantityDetection::not_found("region below box too small");
    }

    let region = BoundingBox::new(bbox.x, strip_top, bbox.width, strip_height);
    let (raw, tokens) = match scan_region(image, &region, engine, cfg) {
        Ok(scan) => scan,
        Err(err) => {
            warn!(error = %err, "quantity OCR failed, reporting null result");
            return QuantityDetection::not_found(format!("OCR failed: {err}"));
        }
    };

    let cleaned = normalize_confusions(raw.trim());
    let quantity = topmost_candidate(&tokens, cfg.detect_min_confidence, cfg.upscale, region.y)
        .and_then(|t| parse_quantity(&normalize_confusions(&t.text)))
        .or_else(|| parse_quantity(&cleaned));

    QuantityDetection {
        found: quantity.is_some(),
        quantity,
        raw_text: raw.trim().to_string(),
        cleaned_text: cleaned,
        note: if quantity.is_some() {
            None
        } else {
            Some("no quantity pattern recognized".to_string())
        },
    }
}

/// Crop variant: OCR the bottom portion of the box interior and, when a
/// quantity annotation is located, shrink the box to exclude it.
///
/// The shrink is accepted only when the new height both meaningfully cuts
/// the box and does not collapse it; otherwise the original box is returned.
pub fn crop_quantity_from_box(
    image: &DynamicImage,
    bbox: &BoundingBox,
    engine: &dyn OcrEngine,
    cfg: &QuantityConfig,
) -> CroppedBox {
    let unchanged = |note: Option<String>| CroppedBox {
        bbox: bbox.clone(),
        modified: false,
        note,
    };

    let region_height = (bbox.height as f32 * cfg.crop_bottom_ratio) as u32;
    if region_height < cfg.min_strip_height {
        return unchanged(Some("box too small for quantity crop".to_string()));
    }
    let region_top = bbox.bottom() - region_height;
    let region = BoundingBox::new(bbox.x, region_top, bbox.width, region_height);

    let (raw, tokens) = match scan_region(image, &region, engine, cfg) {
        Ok(scan) => scan,
        Err(err) => {
            warn!(error = %err, "quantity crop OCR failed, box left unchanged");
            return unchanged(Some(format!("OCR failed: {err}")));
        }
    };

    let Some(best) = topmost_candidate(&tokens, cfg.detect_min_confidence, cfg.upscale, region.y)
    else {
        return unchanged(Some("no quantity text found".to_string()));
    };

    let cleaned = normalize_confusions(&best.text);
    let quantity = parse_quantity(&cleaned).or_else(|| parse_quantity(&normalize_confusions(raw.trim())));

    // Token offset relative to the box top, back in original pixel space
    let best_text_y = (region.y - bbox.y) + best.top / cfg.upscale;
    if best_text_y <= cfg.shrink_min_offset {
        return unchanged(Some("quantity text too close to box top".to_string()));
    }

    let padding = cfg
        .shrink_padding_min
        .max((bbox.height as f32 * cfg.shrink_padding_ratio) as u32);
    let new_height = best_text_y + padding;
    let max_height = (bbox.height as f32 * cfg.shrink_max_ratio) as u32;
    if new_height <= cfg.shrink_min_height || new_height >= max_height {
        debug!(new_height, "computed crop height out of range, box unchanged");
        return unchanged(Some("computed crop out of range".to_string()));
    }

    let mut shrunk = bbox.with_height(new_height);
    shrunk.quantity = quantity;
    shrunk.ocr_text = Some(best.text.clone());
    CroppedBox {
        bbox: shrunk,
        modified: true,
        note: None,
    }
}

/// Crop every box in a batch. A failure on one box never aborts the rest;
/// the result always carries one entry per input box in the input order.
pub fn crop_quantities(
    image: &DynamicImage,
    boxes: &[BoundingBox],
    engine: &dyn OcrEngine,
    cfg: &QuantityConfig,
) -> BatchCrop {
    let cropped: Vec<CroppedBox> = boxes
        .iter()
        .map(|b| crop_quantity_from_box(image, b, engine, cfg))
        .collect();
    let modified = cropped.iter().filter(|c| c.modified).count();
    BatchCrop {
        modified,
        total: cropped.len(),
        boxes: cropped,
    }
}

/// Crop, upscale and binarize a region, then run both OCR passes.
fn scan_region(
    image: &DynamicImage,
    region: &BoundingBox,
    engine: &dyn OcrEngine,
    cfg: &QuantityConfig,
) -> Result<(String, Vec<OcrToken>), super::ocr::OcrError> {
    let binary = prepare_region(image, region, cfg.upscale);
    let raw = engine.recognize_line(&binary, Charset::DigitsAndX)?;
    let tokens = engine.recognize_tokens(&binary, RecognitionMode::SparseText, Charset::Any)?;
    Ok((raw, tokens))
}

/// Upscale with cubic interpolation, then Otsu-binarize. Printed digits at
/// scan resolution are too small for reliable character segmentation.
fn prepare_region(image: &DynamicImage, region: &BoundingBox, upscale: u32) -> GrayImage {
    let crop = crop_box(image, region);
    let scaled = crop.resize_exact(
        crop.width() * upscale,
        crop.height() * upscale,
        FilterType::CatmullRom,
    );
    let gray = scaled.to_luma8();
    let level = otsu_level(&gray);
    threshold(&gray, level, ThresholdType::Binary)
}

/// Pick the candidate token closest to the top of the original image.
fn topmost_candidate<'a>(
    tokens: &'a [OcrToken],
    min_confidence: f32,
    upscale: u32,
    region_top: u32,
) -> Option<&'a OcrToken> {
    tokens
        .iter()
        .filter(|t| t.confidence > min_confidence && is_quantity_shape(&t.text))
        .min_by_key(|t| region_top + t.top / upscale.max(1))
}

/// A token looks like a quantity if it carries the multiplier character or
/// is a short bare number.
pub(crate) fn is_quantity_shape(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() {
        return false;
    }
    if t.chars().any(|c| c.eq_ignore_ascii_case(&'x')) {
        return true;
    }
    t.len() <= 3 && t.chars().all(|c| c.is_ascii_digit())
}

/// Map the usual OCR digit confusions before numeric parsing.
pub(crate) fn normalize_confusions(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'i' | 'I' | 'l' | 'L' => '1',
            'o' | 'O' => '0',
            other => other,
        })
        .collect()
}

fn x_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(\d{1,3})\s*x").expect("valid pattern"))
}

fn bare_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,2}$").expect("valid pattern"))
}

/// Parse a normalized text fragment into a quantity value.
///
/// "Nx" with optional whitespace wins; a bare one- or two-digit number is
/// accepted as a fallback. Out-of-range values are rejected as misreads.
pub(crate) fn parse_quantity(text: &str) -> Option<u32> {
    let t = text.trim();
    if let Some(caps) = x_pattern().captures(t) {
        let n: u32 = caps[1].parse().ok()?;
        if (1..=999).contains(&n) {
            return Some(n);
        }
        return None;
    }
    if bare_number().is_match(t) {
        let n: u32 = t.parse().ok()?;
        if (1..=99).contains(&n) {
            return Some(n);
        }
    }
    None
}
