// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Runtime configuration, environment-variable driven.
//!
//! The pixel thresholds below are tuned empirically for catalog pages stored
//! at roughly 150 DPI and are NOT auto-scaled to the input resolution. They
//! are configuration, not invariants; expect to retune them for a different
//! scan pipeline.

use std::env;
use std::time::Duration;

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Box detector tuning.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Contours with filled area at or below this are noise (studs render ~300px²).
    pub min_area: f64,
    /// Contours with filled area at or above this are page furniture, not parts.
    pub max_area: f64,
    /// Padding applied to every surviving box, clamped to image bounds.
    pub padding: u32,
    /// Padded boxes with width or height at or below this are discarded.
    pub min_box_size: u32,
    /// Radius of the square closing kernel (2 → 5x5 kernel).
    pub closing_radius: u8,
    /// Closing passes; two merge fragmented strokes of one part drawing.
    pub closing_iterations: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_area: 300.0,
            max_area: 80_000.0,
            padding: 5,
            min_box_size: 20,
            closing_radius: 2,
            closing_iterations: 2,
        }
    }
}

impl DetectorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_area: env_parse("DETECT_MIN_AREA", defaults.min_area),
            max_area: env_parse("DETECT_MAX_AREA", defaults.max_area),
            padding: env_parse("DETECT_PADDING", defaults.padding),
            min_box_size: env_parse("DETECT_MIN_BOX_SIZE", defaults.min_box_size),
            closing_radius: defaults.closing_radius,
            closing_iterations: defaults.closing_iterations,
        }
    }
}

/// Quantity extraction tuning.
#[derive(Debug, Clone)]
pub struct QuantityConfig {
    /// Upscale factor applied before OCR; printed digits are tiny at scan size.
    pub upscale: u32,
    /// Variant A: strip below the box has height `strip_height_ratio * box_height`.
    pub strip_height_ratio: f32,
    /// Variant B: OCR only the bottom fraction of the box interior.
    pub crop_bottom_ratio: f32,
    /// Strips shorter than this are reported as "region too small", not an error.
    pub min_strip_height: u32,
    /// Token confidence floor for quantity detection.
    pub detect_min_confidence: f32,
    /// Token confidence floor for the text-removal variant.
    pub removal_min_confidence: f32,
    /// Box shrink: ignore tokens found within this many px of the box top.
    pub shrink_min_offset: u32,
    /// Box shrink: padding below the text line, `max(4, ratio * height)`.
    pub shrink_padding_min: u32,
    pub shrink_padding_ratio: f32,
    /// Box shrink: accepted heights lie strictly inside (min_height, max_ratio * h).
    pub shrink_min_height: u32,
    pub shrink_max_ratio: f32,
    /// Inpainting: padding around each masked token box.
    pub mask_padding: u32,
}

impl Default for QuantityConfig {
    fn default() -> Self {
        Self {
            upscale: 3,
            strip_height_ratio: 0.5,
            crop_bottom_ratio: 0.4,
            min_strip_height: 10,
            detect_min_confidence: 10.0,
            removal_min_confidence: 20.0,
            shrink_min_offset: 10,
            shrink_padding_min: 4,
            shrink_padding_ratio: 0.06,
            shrink_min_height: 20,
            shrink_max_ratio: 0.95,
            mask_padding: 5,
        }
    }
}

impl QuantityConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            upscale: env_parse("QTY_UPSCALE", defaults.upscale),
            detect_min_confidence: env_parse("QTY_MIN_CONFIDENCE", defaults.detect_min_confidence),
            removal_min_confidence: env_parse(
                "QTY_REMOVAL_MIN_CONFIDENCE",
                defaults.removal_min_confidence,
            ),
            ..defaults
        }
    }
}

/// Recognition API client settings.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    pub base_url: String,
    /// Minimum spacing between successive API calls.
    pub rate_limit: Duration,
    pub request_timeout: Duration,
    pub external_catalogs: String,
    pub predict_color: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.brickognize.com".to_string(),
            rate_limit: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
            external_catalogs: "bricklink".to_string(),
            predict_color: true,
        }
    }
}

impl RecognizerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("BRICKOGNIZE_URL").unwrap_or(defaults.base_url),
            rate_limit: Duration::from_millis(env_parse(
                "RECOGNIZE_RATE_LIMIT_MS",
                defaults.rate_limit.as_millis() as u64,
            )),
            request_timeout: Duration::from_secs(env_parse(
                "RECOGNIZE_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            external_catalogs: defaults.external_catalogs,
            predict_color: defaults.predict_color,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub detector: DetectorConfig,
    pub quantity: QuantityConfig,
    pub recognizer: RecognizerConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            detector: DetectorConfig::from_env(),
            quantity: QuantityConfig::from_env(),
            recognizer: RecognizerConfig::from_env(),
        }
    }
}
