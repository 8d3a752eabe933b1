// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Pixel-space geometry types shared across detection, OCR and the API layer

use serde::{Deserialize, Serialize};

/// Axis-aligned box marking one part graphic on a catalog page.
///
/// Coordinates use a top-left origin. A box is a value object: once saved to
/// a session's box list it is only replaced wholesale, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Printed quantity ("2x", "11x") parsed from the annotation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    /// Raw OCR text the quantity was parsed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            quantity: None,
            ocr_text: None,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check the box has positive extent and lies fully inside an image.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.right() <= image_width
            && self.bottom() <= image_height
    }

    /// Expand the box by `padding` on every side, clamped to the image bounds.
    pub fn padded(&self, padding: u32, image_width: u32, image_height: u32) -> BoundingBox {
        let x = self.x.saturating_sub(padding);
        let y = self.y.saturating_sub(padding);
        let right = (self.right() + padding).min(image_width);
        let bottom = (self.bottom() + padding).min(image_height);
        BoundingBox {
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
            quantity: self.quantity,
            ocr_text: self.ocr_text.clone(),
        }
    }

    /// Same box with a replacement height, keeping quantity/OCR annotations.
    pub fn with_height(&self, height: u32) -> BoundingBox {
        BoundingBox {
            height,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_within_checks_extent_and_bounds() {
        let bbox = BoundingBox::new(10, 10, 50, 40);
        assert!(bbox.fits_within(100, 100));
        assert!(!bbox.fits_within(59, 100));
        assert!(!bbox.fits_within(100, 49));
        assert!(!BoundingBox::new(0, 0, 0, 10).fits_within(100, 100));
    }

    #[test]
    fn padded_clamps_to_image_edges() {
        let bbox = BoundingBox::new(2, 3, 10, 10);
        let padded = bbox.padded(5, 100, 100);
        assert_eq!((padded.x, padded.y), (0, 0));
        assert_eq!((padded.width, padded.height), (17, 18));

        let near_edge = BoundingBox::new(90, 90, 8, 8);
        let padded = near_edge.padded(5, 100, 100);
        assert_eq!(padded.right(), 100);
        assert_eq!(padded.bottom(), 100);
    }

    #[test]
    fn padded_preserves_annotations() {
        let mut bbox = BoundingBox::new(10, 10, 20, 20);
        bbox.quantity = Some(4);
        bbox.ocr_text = Some("4x".to_string());
        let padded = bbox.padded(2, 100, 100);
        assert_eq!(padded.quantity, Some(4));
        assert_eq!(padded.ocr_text.as_deref(), Some("4x"));
    }

    #[test]
    fn serializes_without_empty_annotations() {
        let bbox = BoundingBox::new(1, 2, 3, 4);
        let json = serde_json::to_string(&bbox).unwrap();
        assert!(!json.contains("quantity"));
        assert!(!json.contains("ocr_text"));
    }
}
