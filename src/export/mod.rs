// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Export formats for reviewed part lists.

pub mod bricklink;
pub mod colors;

pub use bricklink::{collect_export, inventory_xml, reviewed_parts_csv, ExportPart, ExportSummary};
pub use colors::{color_id, color_name, resolve_color, BRICKLINK_COLORS};
