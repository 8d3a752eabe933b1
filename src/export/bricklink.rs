// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Export of reviewed parts: summary JSON, BrickLink inventory XML and CSV.

use serde::Serialize;
use tracing::warn;

use crate::session::AnalyzedPart;

use super::colors::resolve_color;

/// One exportable part after review.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPart {
    pub part_num: String,
    /// Optional supplier article number; appended to `P`-prefixed part
    /// numbers in the BrickLink item id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_num: Option<String>,
    /// BrickLink color id as a string, or the raw reviewer value when it
    /// could not be resolved.
    pub color_id: String,
    pub quantity: u32,
    pub original_name: String,
    pub confidence: f32,
}

/// Review-stage totals plus the exportable part list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total_parts: usize,
    pub recognized_parts: usize,
    pub unrecognized_count: usize,
    pub skipped_count: usize,
    pub parts: Vec<ExportPart>,
}

/// Fold analyzed parts and their reviews into an export summary. Parts
/// without a review, or reviews without a part number, are left out of the
/// part list but still count toward the total.
pub fn collect_export(parts: &[AnalyzedPart]) -> ExportSummary {
    let mut exportable = Vec::new();
    let mut unrecognized = 0;
    let mut skipped = 0;

    for part in parts {
        let Some(review) = &part.review else { continue };
        if review.unknown || review.no_match {
            unrecognized += 1;
            continue;
        }
        if review.skip {
            skipped += 1;
            continue;
        }
        let Some(part_num) = review.part_num.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };

        let raw_color = review.color.clone().unwrap_or_default();
        let color_id = resolve_color(&raw_color)
            .map(|id| id.to_string())
            .unwrap_or(raw_color);

        let (original_name, confidence) = match &part.outcome.part {
            Some(m) => (m.name.clone(), m.score),
            None => ("Unknown".to_string(), 0.0),
        };

        exportable.push(ExportPart {
            part_num: part_num.to_string(),
            article_num: None,
            color_id,
            quantity: review.quantity.max(1),
            original_name,
            confidence,
        });
    }

    ExportSummary {
        total_parts: parts.len(),
        recognized_parts: exportable.len(),
        unrecognized_count: unrecognized,
        skipped_count: skipped,
        parts: exportable,
    }
}

/// Render a BrickLink `INVENTORY` upload document.
///
/// Parts whose color does not resolve to a BrickLink id are skipped; the
/// upload format rejects free-form color values.
pub fn inventory_xml(parts: &[ExportPart]) -> String {
    let mut out = String::from("<INVENTORY>");
    for part in parts {
        let Some(color_id) = resolve_color(&part.color_id) else {
            warn!(
                part = %part.part_num,
                color = %part.color_id,
                "color not in BrickLink color map, skipping part"
            );
            continue;
        };

        let item_id = match (&part.article_num, part.part_num.starts_with('P')) {
            (Some(article), true) => format!("{}-{}", part.part_num, article),
            _ => part.part_num.clone(),
        };

        out.push_str("<ITEM>");
        out.push_str("<ITEMTYPE>P</ITEMTYPE>");
        out.push_str(&format!("<ITEMID>{}</ITEMID>", escape_xml(&item_id)));
        out.push_str(&format!("<COLOR>{color_id}</COLOR>"));
        out.push_str(&format!("<MINQTY>{}</MINQTY>", part.quantity));
        out.push_str("</ITEM>");
    }
    out.push_str("</INVENTORY>");
    out
}

/// CSV of reviewed parts with their source box coordinates.
pub fn reviewed_parts_csv(parts: &[AnalyzedPart]) -> Result<String, anyhow::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "part_num", "name", "color", "quantity", "confidence", "image", "x", "y", "width",
        "height",
    ])?;

    for part in parts {
        let Some(review) = &part.review else { continue };
        if review.skip || review.unknown || review.no_match {
            continue;
        }
        let Some(part_num) = review.part_num.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        let (name, confidence) = match &part.outcome.part {
            Some(m) => (m.name.as_str(), m.score),
            None => ("Unknown", 0.0),
        };
        writer.write_record([
            part_num,
            name,
            review.color.as_deref().unwrap_or(""),
            &review.quantity.max(1).to_string(),
            &format!("{confidence:.3}"),
            &part.image_name,
            &part.bbox.x.to_string(),
            &part.bbox.y.to_string(),
            &part.bbox.width.to_string(),
            &part.bbox.height.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("finalizing csv: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::{PartMatch, RecognitionOutcome};
    use crate::session::PartReview;
    use crate::vision::types::BoundingBox;

    fn analyzed(part_num: Option<&str>, color: Option<&str>, review_flags: (bool, bool, bool)) -> AnalyzedPart {
        let (skip, unknown, no_match) = review_flags;
        AnalyzedPart {
            image_name: "page1.png".to_string(),
            bbox: BoundingBox::new(10, 20, 80, 60),
            crop_jpeg: Vec::new(),
            outcome: RecognitionOutcome {
                part: Some(PartMatch {
                    id: "3022".to_string(),
                    name: "Plate 2 x 2".to_string(),
                    score: 0.91,
                    img_url: None,
                }),
                colors: Vec::new(),
                error: None,
            },
            review: Some(PartReview {
                part_num: part_num.map(str::to_string),
                color: color.map(str::to_string),
                quantity: 4,
                skip,
                unknown,
                no_match,
            }),
        }
    }

    #[test]
    fn summary_buckets_reviews() {
        let parts = vec![
            analyzed(Some("3022"), Some("Black"), (false, false, false)),
            analyzed(None, None, (true, false, false)),
            analyzed(None, None, (false, true, false)),
        ];
        let summary = collect_export(&parts);
        assert_eq!(summary.total_parts, 3);
        assert_eq!(summary.recognized_parts, 1);
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(summary.unrecognized_count, 1);
        // Color name resolved to its BrickLink id
        assert_eq!(summary.parts[0].color_id, "11");
        assert_eq!(summary.parts[0].quantity, 4);
    }

    #[test]
    fn xml_contains_item_per_part() {
        let summary = collect_export(&[analyzed(Some("3022"), Some("5"), (false, false, false))]);
        let xml = inventory_xml(&summary.parts);
        assert_eq!(
            xml,
            "<INVENTORY><ITEM><ITEMTYPE>P</ITEMTYPE><ITEMID>3022</ITEMID>\
             <COLOR>5</COLOR><MINQTY>4</MINQTY></ITEM></INVENTORY>"
        );
    }

    #[test]
    fn xml_skips_unknown_colors() {
        let summary = collect_export(&[
            analyzed(Some("3022"), Some("Black"), (false, false, false)),
            analyzed(Some("3001"), Some("Imaginary Teal"), (false, false, false)),
        ]);
        let xml = inventory_xml(&summary.parts);
        assert!(xml.contains("<ITEMID>3022</ITEMID>"));
        assert!(!xml.contains("3001"));
    }

    #[test]
    fn p_prefixed_ids_get_article_suffix() {
        let part = ExportPart {
            part_num: "P1234".to_string(),
            article_num: Some("500123".to_string()),
            color_id: "11".to_string(),
            quantity: 1,
            original_name: "Plate".to_string(),
            confidence: 0.5,
        };
        let xml = inventory_xml(&[part]);
        assert!(xml.contains("<ITEMID>P1234-500123</ITEMID>"));
    }

    #[test]
    fn csv_has_header_and_box_coordinates() {
        let parts = vec![analyzed(Some("3022"), Some("Black"), (false, false, false))];
        let csv = reviewed_parts_csv(&parts).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "part_num,name,color,quantity,confidence,image,x,y,width,height"
        );
        assert_eq!(
            lines.next().unwrap(),
            "3022,Plate 2 x 2,Black,4,0.910,page1.png,10,20,80,60"
        );
    }

    #[test]
    fn csv_excludes_skipped_parts() {
        let parts = vec![
            analyzed(Some("3022"), Some("Black"), (false, false, false)),
            analyzed(Some("9999"), Some("Black"), (true, false, false)),
        ];
        let csv = reviewed_parts_csv(&parts).unwrap();
        assert!(!csv.contains("9999"));
    }
}
