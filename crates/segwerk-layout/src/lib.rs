// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// segwerk-layout: Page layout analysis for scanned documents.
//
// Provides binarization, constrained run-length smearing, shape extraction,
// skew estimation, ruled-line removal, segment merging, reading-order sorting
// and region classification, tied together by `PageAnalyzer`, plus a
// finishing plan that renders each region with the method suited to its
// content type.

pub mod analyzer;
pub mod bitmap;
pub mod classify;
pub mod extract;
pub mod finishing;
pub mod geometry;
pub mod image;
pub mod lines;
pub mod merge;
pub mod order;
pub mod segment;
pub mod skew;
pub mod smear;

// Re-export the primary types so callers can use `segwerk_layout::PageAnalyzer` etc.
pub use analyzer::PageAnalyzer;
pub use bitmap::Bitmap;
pub use classify::RegionClassifier;
pub use finishing::{FinishingPlan, RegionFinisher};
pub use geometry::{BoundingBox, RotatedRect, Tolerance};
pub use crate::image::PageImage;
pub use merge::SegmentMerger;
pub use order::sort_reading_order;
pub use segment::{PageReport, Segment, SegmentedPage};
pub use skew::SkewEstimate;
