// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Automatic part-box detection.
//!
//! Turns a scanned catalog page into candidate part boxes: Otsu
//! binarization (inverted, so part graphics come out as white blobs),
//! morphological closing to merge fragmented strokes, external contour
//! extraction, then an area filter with padding. Deterministic for a given
//! pixel input.

use image::DynamicImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;
use imageproc::point::Point;
use tracing::debug;

use crate::config::DetectorConfig;

use super::types::BoundingBox;

/// Detect candidate part boxes on a page, sorted top-to-bottom then
/// left-to-right. An all-background page yields an empty list.
pub fn detect_boxes(image: &DynamicImage, cfg: &DetectorConfig) -> Vec<BoundingBox> {
    let (width, height) = (image.width(), image.height());
    let gray = image.to_luma8();

    // Invert so foreground objects are white for contour extraction
    let level = otsu_level(&gray);
    let mut binary = threshold(&gray, level, ThresholdType::BinaryInverted);

    // Closing merges strokes of the same part drawing into one blob
    for _ in 0..cfg.closing_iterations {
        binary = close(&binary, Norm::LInf, cfg.closing_radius);
    }

    let contours = find_contours::<i32>(&binary);
    let mut boxes = Vec::new();

    for contour in &contours {
        // External boundaries only; holes and nested contours are not parts
        if contour.border_type != BorderType::Outer || contour.parent.is_some() {
            continue;
        }
        if contour.points.len() < 4 {
            continue;
        }

        let area = contour_area(&contour.points);
        if area <= cfg.min_area || area >= cfg.max_area {
            continue;
        }

        let bbox = enclosing_rect(&contour.points).padded(cfg.padding, width, height);
        if bbox.width > cfg.min_box_size && bbox.height > cfg.min_box_size {
            boxes.push(bbox);
        }
    }

    // Approximate natural reading order on a parts-list page
    boxes.sort_by_key(|b| (b.y, b.x));

    debug!(
        contours = contours.len(),
        boxes = boxes.len(),
        "box detection complete"
    );

    boxes
}

/// Filled area of a closed contour via the shoelace formula, matching what
/// OpenCV's `contourArea` computes for a boundary polygon.
fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc: i64 = 0;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        acc += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (acc.abs() as f64) / 2.0
}

fn enclosing_rect(points: &[Point<i32>]) -> BoundingBox {
    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    BoundingBox::new(
        min_x.max(0) as u32,
        min_y.max(0) as u32,
        (max_x - min_x + 1).max(1) as u32,
        (max_y - min_y + 1).max(1) as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn page_with_rects(rects: &[(u32, u32, u32, u32)]) -> DynamicImage {
        let mut img = RgbImage::from_pixel(400, 400, Rgb([255, 255, 255]));
        for &(x, y, w, h) in rects {
            for yy in y..y + h {
                for xx in x..x + w {
                    img.put_pixel(xx, yy, Rgb([20, 20, 20]));
                }
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn blank_page_yields_no_boxes() {
        let img = page_with_rects(&[]);
        assert!(detect_boxes(&img, &DetectorConfig::default()).is_empty());
    }

    #[test]
    fn detects_each_disjoint_rect_once() {
        // Three filled rects, areas well inside (300, 80000), far apart
        let img = page_with_rects(&[(30, 40, 60, 40), (200, 40, 50, 50), (80, 200, 70, 30)]);
        let boxes = detect_boxes(&img, &DetectorConfig::default());
        assert_eq!(boxes.len(), 3);
    }

    #[test]
    fn boxes_sorted_reading_order() {
        let img = page_with_rects(&[(250, 200, 60, 40), (30, 30, 60, 40), (200, 30, 60, 40)]);
        let boxes = detect_boxes(&img, &DetectorConfig::default());
        assert_eq!(boxes.len(), 3);
        assert!(boxes[0].y <= boxes[1].y && boxes[1].y <= boxes[2].y);
        // The two top-row boxes are ordered left to right
        assert!(boxes[0].x < boxes[1].x);
    }

    #[test]
    fn padding_stays_within_tolerance() {
        let img = page_with_rects(&[(100, 100, 60, 40)]);
        let boxes = detect_boxes(&img, &DetectorConfig::default());
        assert_eq!(boxes.len(), 1);
        let b = &boxes[0];
        // 5px padding on each side, so the blob origin shifts by at most 5+closing slack
        assert!(b.x >= 93 && b.x <= 100, "x = {}", b.x);
        assert!(b.y >= 93 && b.y <= 100, "y = {}", b.y);
        assert!(b.width >= 60 && b.width <= 75, "width = {}", b.width);
        assert!(b.height >= 40 && b.height <= 55, "height = {}", b.height);
    }

    #[test]
    fn tiny_specks_are_filtered() {
        // 10x10 = 100px² is below the 300px² floor
        let img = page_with_rects(&[(50, 50, 10, 10)]);
        assert!(detect_boxes(&img, &DetectorConfig::default()).is_empty());
    }

    #[test]
    fn oversized_blobs_are_filtered() {
        // 350x300 = 105000px² exceeds the 80000px² ceiling
        let img = page_with_rects(&[(20, 20, 350, 300)]);
        assert!(detect_boxes(&img, &DetectorConfig::default()).is_empty());
    }

    #[test]
    fn area_shoelace_matches_rectangle() {
        let square = vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert_eq!(contour_area(&square), 100.0);
    }
}
