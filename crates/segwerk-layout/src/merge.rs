// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Segment merger: collapses extracted shapes into content segments.
//
// Four passes, each repeated until it stops reducing the segment count:
//
// 1. Intersection absorption (largest first).
// 2. Conservative merge: vertically adjacent fragments of equal width whose
//    horizontal extents nest, i.e. lines of one paragraph column.
// 3. Bold merge (reading order): intersecting boxes, or a box starting just
//    below another's bottom-left corner, i.e. a short trailing line.
// 4. Intersection absorption again, for overlaps the bold pass created.
//
// The whole sequence repeats while it keeps shrinking the set, up to
// `max_rounds` times.

use std::cmp::Reverse;

use segwerk_core::config::MergeConfig;
use tracing::{debug, info, instrument};

use crate::geometry::Tolerance;
use crate::segment::Segment;

/// Candidate ordering for one scan pass.
#[derive(Debug, Clone, Copy)]
enum PassOrder {
    /// Area descending, then position.
    LargestFirst,
    /// Top edge, then left edge.
    Reading,
}

pub struct SegmentMerger {
    config: MergeConfig,
}

impl SegmentMerger {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Run all passes to their fixpoints.
    #[instrument(skip(self, segments), fields(input = segments.len()))]
    pub fn merge(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let input = segments.len();
        let mut current = segments;

        for round in 0..self.config.max_rounds {
            let before = current.len();
            current = self.absorb_intersections(current);
            current = self.conservative_merge(current);
            current = self.bold_merge(current);
            current = self.absorb_intersections(current);
            debug!(round, before, after = current.len(), "Merge round complete");
            if current.len() >= before {
                break;
            }
        }

        info!(input, output = current.len(), "Segments merged");
        current
    }

    /// Fold every segment that intersects an accepted one into it.
    pub fn absorb_intersections(&self, segments: Vec<Segment>) -> Vec<Segment> {
        to_fixpoint(segments, PassOrder::LargestFirst, |accepted, candidate| {
            accepted.bbox.intersects(&candidate.bbox)
        })
    }

    /// Merge line fragments of the same column.
    pub fn conservative_merge(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let vertical = Tolerance::px(self.config.vertical_tolerance);
        let horizontal = Tolerance::px(self.config.horizontal_tolerance);
        let ratio = self.config.width_ratio;
        to_fixpoint(segments, PassOrder::LargestFirst, |accepted, candidate| {
            let (a, c) = (&accepted.bbox, &candidate.bbox);
            a.is_vertically_near(c, vertical)
                && (a.contains_horizontally(c, horizontal) || c.contains_horizontally(a, horizontal))
                && a.width_ratio(c) >= ratio
        })
    }

    /// Merge intersecting boxes and trailing lines hanging off a box's
    /// bottom-left corner.
    pub fn bold_merge(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let tolerance = Tolerance::px(self.config.bold_tolerance);
        to_fixpoint(segments, PassOrder::Reading, |accepted, candidate| {
            accepted.bbox.intersects(&candidate.bbox)
                || accepted.bbox.aligns_bottom_left(&candidate.bbox, tolerance)
        })
    }
}

impl Default for SegmentMerger {
    fn default() -> Self {
        Self::new(MergeConfig::default())
    }
}

/// Repeat `scan_pass` until the count stops dropping.
fn to_fixpoint(
    mut segments: Vec<Segment>,
    order: PassOrder,
    can_merge: impl Fn(&Segment, &Segment) -> bool,
) -> Vec<Segment> {
    loop {
        let before = segments.len();
        segments = scan_pass(segments, order, &can_merge);
        if segments.len() >= before {
            return segments;
        }
    }
}

/// One scan: each candidate joins the first accepted segment it may merge
/// with, or becomes accepted itself.
fn scan_pass(
    mut segments: Vec<Segment>,
    order: PassOrder,
    can_merge: &impl Fn(&Segment, &Segment) -> bool,
) -> Vec<Segment> {
    match order {
        PassOrder::LargestFirst => segments.sort_by_key(|s| (Reverse(s.area()), s.bbox)),
        PassOrder::Reading => segments.sort_by_key(|s| s.bbox),
    }

    let mut accepted: Vec<Segment> = Vec::with_capacity(segments.len());
    for candidate in segments {
        match accepted.iter_mut().find(|a| can_merge(a, &candidate)) {
            Some(target) => target.merge(&candidate),
            None => accepted.push(candidate),
        }
    }
    accepted
}
