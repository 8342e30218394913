// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ruled-line removal. Short ink runs are erased with a background smear so
// only long rules survive; thin survivors are masked out of the original
// bitmap before segmentation.

use imageproc::distance_transform::Norm;
use imageproc::morphology;
use segwerk_core::config::{ExtractConfig, LineConfig};
use tracing::{debug, info, instrument};

use crate::bitmap::Bitmap;
use crate::extract::{Shape, extract_shapes};
use crate::geometry::BoundingBox;
use crate::smear::{smear_horizontal, smear_vertical};

/// Detected rules and the mask covering them.
#[derive(Debug, Clone)]
pub struct LineMask {
    /// Dilated removal mask, same size as the analysed bitmap.
    pub mask: Bitmap,
    /// Bounding boxes of the accepted rules.
    pub lines: Vec<BoundingBox>,
}

impl LineMask {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Find ruled lines in `bitmap`.
#[instrument(skip(bitmap, config), fields(width = bitmap.width(), height = bitmap.height()))]
pub fn detect_lines(bitmap: &Bitmap, config: &LineConfig) -> LineMask {
    let mut raw = Bitmap::new(bitmap.width(), bitmap.height());
    let mut lines = Vec::new();

    let horizontal = smear_horizontal(bitmap, config.smear_constraint, false);
    collect_rules(&horizontal, config, &mut raw, &mut lines);

    if config.detect_vertical {
        let vertical = smear_vertical(bitmap, config.smear_constraint, false);
        collect_rules(&vertical, config, &mut raw, &mut lines);
    }

    let mask = if config.dilation > 0 && !lines.is_empty() {
        Bitmap::from_mask(&morphology::dilate(&raw.to_mask(), Norm::LInf, config.dilation))
    } else {
        raw
    };

    debug!(
        rules = lines.len(),
        masked = mask.foreground_count(),
        "Ruled lines detected"
    );
    LineMask { mask, lines }
}

/// Detect ruled lines and erase them from `bitmap`. The input is left intact.
pub fn remove_lines(bitmap: &Bitmap, config: &LineConfig) -> (Bitmap, LineMask) {
    let found = detect_lines(bitmap, config);
    if found.is_empty() {
        return (bitmap.clone(), found);
    }
    let cleaned = bitmap.subtract(&found.mask);
    info!(
        rules = found.lines.len(),
        removed = bitmap.foreground_count() - cleaned.foreground_count(),
        "Ruled lines removed"
    );
    (cleaned, found)
}

/// Rank shapes of `smeared` by eccentricity and paint the thin ones into `raw`.
fn collect_rules(smeared: &Bitmap, config: &LineConfig, raw: &mut Bitmap, lines: &mut Vec<BoundingBox>) {
    let extract = ExtractConfig {
        connectivity: config.connectivity,
        min_area: config.min_area,
    };
    let mut shapes: Vec<Shape> = extract_shapes(smeared, &extract);
    shapes.sort_by(|a, b| a.rotated.eccentricity().total_cmp(&b.rotated.eccentricity()));

    for shape in shapes
        .iter()
        .take_while(|s| s.rotated.eccentricity() < config.max_eccentricity)
    {
        let b = shape.bbox;
        for y in b.y1()..=b.y2() {
            for x in b.x1()..=b.x2() {
                let (x, y) = (x as u32, y as u32);
                if smeared.get(x, y) {
                    raw.set(x, y, true);
                }
            }
        }
        lines.push(b);
    }
}
