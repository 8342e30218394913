// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Constrained run-length smearing (CRLA).
//
// A run is a maximal stretch of non-boundary pixels with a boundary pixel on
// both ends. Runs shorter than the constraint are painted with the boundary
// colour. Runs touching the image edge are never painted.

use segwerk_core::config::SmearConfig;
use tracing::{debug, instrument};

use crate::bitmap::Bitmap;

/// Smear every row of `bitmap` independently.
///
/// With `boundary == true` short background gaps between ink are filled; with
/// `boundary == false` short ink runs between background are erased.
pub fn smear_horizontal(bitmap: &Bitmap, constraint: u32, boundary: bool) -> Bitmap {
    let mut out = bitmap.clone();
    if constraint == 0 {
        return out;
    }
    let limit = constraint as usize;
    for y in 0..out.height() {
        smear_row(out.row_mut(y), limit, boundary);
    }
    out
}

/// Smear every column: rotate, smear rows, rotate back.
pub fn smear_vertical(bitmap: &Bitmap, constraint: u32, boundary: bool) -> Bitmap {
    if constraint == 0 {
        return bitmap.clone();
    }
    smear_horizontal(&bitmap.rotate90(), constraint, boundary).rotate270()
}

/// Full CRLA used for segmentation: horizontal and vertical foreground smears,
/// their intersection, then a short horizontal smear to close what the
/// intersection reopened.
#[instrument(skip(bitmap), fields(width = bitmap.width(), height = bitmap.height()))]
pub fn crla(bitmap: &Bitmap, config: &SmearConfig) -> Bitmap {
    let horizontal = smear_horizontal(bitmap, config.horizontal, true);
    let vertical = smear_vertical(bitmap, config.vertical, true);
    let combined = horizontal.and(&vertical);
    let out = smear_horizontal(&combined, config.final_horizontal, true);
    debug!(
        before = bitmap.foreground_count(),
        after = out.foreground_count(),
        "CRLA smear complete"
    );
    out
}

fn smear_row(row: &mut [bool], limit: usize, boundary: bool) {
    let mut last_boundary: Option<usize> = None;
    for x in 0..row.len() {
        if row[x] != boundary {
            continue;
        }
        if let Some(start) = last_boundary {
            let run = x - start - 1;
            if run > 0 && run < limit {
                row[start + 1..x].fill(boundary);
            }
        }
        last_boundary = Some(x);
    }
}
