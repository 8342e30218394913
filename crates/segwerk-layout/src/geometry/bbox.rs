// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Axis-aligned bounding boxes with inclusive integer corners, and the
// proximity / containment / alignment predicates the merger and sorter use.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Slack, in pixels, granted to a single "near" comparison.
///
/// Every predicate that compares edges approximately takes one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tolerance(u32);

impl Tolerance {
    pub const EXACT: Tolerance = Tolerance(0);

    pub const fn px(pixels: u32) -> Self {
        Tolerance(pixels)
    }

    pub fn pixels(self) -> i32 {
        self.0.min(i32::MAX as u32) as i32
    }

    /// `|a - b| <= tolerance`.
    pub fn near(self, a: i32, b: i32) -> bool {
        (a as i64 - b as i64).abs() <= self.0 as i64
    }
}

/// Axis-aligned box with inclusive corners `(x1, y1)` and `(x2, y2)`.
///
/// Always satisfies `x1 <= x2` and `y1 <= y2`. The natural ordering is by top
/// edge, then left edge, then bottom and right edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl BoundingBox {
    /// Build a box from inclusive corners. Panics on an inverted box.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        assert!(
            x1 <= x2 && y1 <= y2,
            "inverted bounding box ({x1}, {y1}) - ({x2}, {y2})"
        );
        Self { x1, y1, x2, y2 }
    }

    pub fn x1(&self) -> i32 {
        self.x1
    }

    pub fn y1(&self) -> i32 {
        self.y1
    }

    pub fn x2(&self) -> i32 {
        self.x2
    }

    pub fn y2(&self) -> i32 {
        self.y2
    }

    pub fn width(&self) -> u32 {
        (self.x2 as i64 - self.x1 as i64 + 1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y2 as i64 - self.y1 as i64 + 1) as u32
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Short side over long side, in (0, 1]. Thin elongated boxes score low.
    pub fn eccentricity(&self) -> f64 {
        let (w, h) = (self.width() as f64, self.height() as f64);
        w.min(h) / w.max(h)
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.x1 as f64 + self.x2 as f64) / 2.0,
            (self.y1 as f64 + self.y2 as f64) / 2.0,
        )
    }

    /// Widen `self` in place to cover `other` as well.
    pub fn merge(&mut self, other: &BoundingBox) {
        self.x1 = self.x1.min(other.x1);
        self.y1 = self.y1.min(other.y1);
        self.x2 = self.x2.max(other.x2);
        self.y2 = self.y2.max(other.y2);
        assert!(
            self.x1 <= self.x2 && self.y1 <= self.y2,
            "merge produced inverted box {self:?}"
        );
    }

    /// Union of `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        out.merge(other);
        out
    }

    /// Whether the two boxes share at least one pixel.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.x1 <= other.x1 && other.x2 <= self.x2 && self.y1 <= other.y1 && other.y2 <= self.y2
    }

    /// Pixels of background between the two boxes along the y axis; 0 when
    /// their vertical extents touch or overlap.
    pub fn vertical_gap(&self, other: &BoundingBox) -> u32 {
        let gap = (other.y1 as i64 - self.y2 as i64 - 1).max(self.y1 as i64 - other.y2 as i64 - 1);
        gap.max(0) as u32
    }

    /// Vertical gap no wider than `tolerance`.
    pub fn is_vertically_near(&self, other: &BoundingBox, tolerance: Tolerance) -> bool {
        self.vertical_gap(other) as i64 <= tolerance.pixels() as i64
    }

    /// Whether `other`'s horizontal extent lies within `self`'s, each edge
    /// allowed to overhang by `tolerance`.
    pub fn contains_horizontally(&self, other: &BoundingBox, tolerance: Tolerance) -> bool {
        let t = tolerance.pixels() as i64;
        self.x1 as i64 - t <= other.x1 as i64 && other.x2 as i64 <= self.x2 as i64 + t
    }

    /// Narrower width over wider width, in (0, 1].
    pub fn width_ratio(&self, other: &BoundingBox) -> f64 {
        let (a, b) = (self.width() as f64, other.width() as f64);
        a.min(b) / a.max(b)
    }

    /// Whether `other` starts directly below `self`'s bottom-left corner:
    /// left edges within `tolerance`, and `other`'s top within `tolerance`
    /// of the row just below `self`.
    pub fn aligns_bottom_left(&self, other: &BoundingBox, tolerance: Tolerance) -> bool {
        tolerance.near(self.x1, other.x1) && tolerance.near(self.y2.saturating_add(1), other.y1)
    }
}

impl Ord for BoundingBox {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y1
            .cmp(&other.y1)
            .then_with(|| self.x1.cmp(&other.x1))
            .then_with(|| self.y2.cmp(&other.y2))
            .then_with(|| self.x2.cmp(&other.x2))
    }
}

impl PartialOrd for BoundingBox {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_attributes() {
        let b = BoundingBox::new(10, 20, 19, 24);
        assert_eq!(b.width(), 10);
        assert_eq!(b.height(), 5);
        assert_eq!(b.area(), 50);
        assert!((b.eccentricity() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn single_pixel_box() {
        let b = BoundingBox::new(3, 3, 3, 3);
        assert_eq!(b.area(), 1);
        assert_eq!(b.eccentricity(), 1.0);
    }

    #[test]
    #[should_panic(expected = "inverted bounding box")]
    fn inverted_box_panics() {
        let _ = BoundingBox::new(5, 0, 4, 0);
    }

    #[test]
    fn merge_covers_both() {
        let mut a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(20, 5, 30, 40);
        a.merge(&b);
        assert_eq!(a, BoundingBox::new(0, 0, 30, 40));
    }

    #[test]
    fn intersection_is_inclusive() {
        let a = BoundingBox::new(0, 0, 10, 10);
        assert!(a.intersects(&BoundingBox::new(10, 10, 12, 12)));
        assert!(!a.intersects(&BoundingBox::new(11, 0, 12, 10)));
    }

    #[test]
    fn gaps_between_boxes() {
        let a = BoundingBox::new(0, 0, 10, 29);
        let b = BoundingBox::new(0, 40, 10, 69);
        assert_eq!(a.vertical_gap(&b), 10);
        assert_eq!(b.vertical_gap(&a), 10);
        assert!(a.is_vertically_near(&b, Tolerance::px(10)));
        assert!(!a.is_vertically_near(&b, Tolerance::px(9)));
    }

    #[test]
    fn horizontal_containment_with_slack() {
        let wide = BoundingBox::new(100, 0, 500, 10);
        let narrow = BoundingBox::new(95, 20, 503, 30);
        assert!(!wide.contains_horizontally(&narrow, Tolerance::EXACT));
        assert!(wide.contains_horizontally(&narrow, Tolerance::px(5)));
    }

    #[test]
    fn bottom_left_alignment() {
        let para = BoundingBox::new(100, 0, 900, 299);
        let trailing = BoundingBox::new(104, 310, 400, 339);
        assert!(para.aligns_bottom_left(&trailing, Tolerance::px(12)));
        assert!(!para.aligns_bottom_left(&trailing, Tolerance::px(8)));
        let indented = BoundingBox::new(160, 305, 400, 339);
        assert!(!para.aligns_bottom_left(&indented, Tolerance::px(24)));
    }

    #[test]
    fn ordering_is_top_then_left() {
        let mut boxes = vec![
            BoundingBox::new(50, 10, 60, 20),
            BoundingBox::new(0, 10, 5, 20),
            BoundingBox::new(0, 0, 100, 5),
        ];
        boxes.sort();
        assert_eq!(boxes[0], BoundingBox::new(0, 0, 100, 5));
        assert_eq!(boxes[1], BoundingBox::new(0, 10, 5, 20));
    }
}
