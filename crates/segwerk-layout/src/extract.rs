// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shape extraction: label connected foreground components of a (smeared)
// bitmap and fit axis-aligned and oriented rectangles to each.

use image::Luma;
use imageproc::point::Point;
use imageproc::region_labelling::{self, Connectivity as Adjacency};
use segwerk_core::Connectivity;
use segwerk_core::config::ExtractConfig;
use tracing::{debug, instrument};

use crate::bitmap::Bitmap;
use crate::geometry::{BoundingBox, RotatedRect};
use crate::segment::Segment;

/// One connected foreground component.
#[derive(Debug, Clone)]
pub struct Shape {
    pub bbox: BoundingBox,
    pub rotated: RotatedRect,
    /// Ink pixels in the component.
    pub pixels: u64,
    /// Outer pixel-edge outline: the left and right edges of every row span.
    pub outline: Vec<Point<i32>>,
}

impl Shape {
    pub fn to_segment(&self) -> Segment {
        Segment::new(self.bbox)
    }
}

/// Per-label running state while scanning the label image.
struct Accumulator {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    pixels: u64,
    /// `(y, leftmost x, rightmost x)` per row, rows ascending.
    spans: Vec<(i32, i32, i32)>,
}

impl Accumulator {
    fn new(x: i32, y: i32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            pixels: 0,
            spans: Vec::new(),
        }
    }

    fn add(&mut self, x: i32, y: i32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
        self.pixels += 1;
        match self.spans.last_mut() {
            Some((row, left, right)) if *row == y => {
                *left = (*left).min(x);
                *right = (*right).max(x);
            }
            _ => self.spans.push((y, x, x)),
        }
    }

    fn into_shape(self) -> Shape {
        let mut outline = Vec::with_capacity(self.spans.len() * 4);
        for &(y, left, right) in &self.spans {
            outline.push(Point::new(left, y));
            outline.push(Point::new(left, y + 1));
            outline.push(Point::new(right + 1, y));
            outline.push(Point::new(right + 1, y + 1));
        }
        let rotated = RotatedRect::from_points(&outline);
        Shape {
            bbox: BoundingBox::new(self.min_x, self.min_y, self.max_x, self.max_y),
            rotated,
            pixels: self.pixels,
            outline,
        }
    }
}

/// Extract connected components of `bitmap` whose bounding-box area reaches
/// `config.min_area`. Shapes come out in raster order of their first pixel.
#[instrument(skip(bitmap), fields(width = bitmap.width(), height = bitmap.height()))]
pub fn extract_shapes(bitmap: &Bitmap, config: &ExtractConfig) -> Vec<Shape> {
    if bitmap.is_empty() {
        return Vec::new();
    }

    let adjacency = match config.connectivity {
        Connectivity::Four => Adjacency::Four,
        Connectivity::Eight => Adjacency::Eight,
    };
    let labels = region_labelling::connected_components(&bitmap.to_mask(), adjacency, Luma([0u8]));

    let max_label = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0) as usize;
    let mut accumulators: Vec<Option<Accumulator>> = Vec::new();
    accumulators.resize_with(max_label + 1, || None);
    let mut first_seen: Vec<usize> = Vec::new();

    for (x, y, label) in labels.enumerate_pixels() {
        let label = label.0[0] as usize;
        if label == 0 {
            continue;
        }
        let (x, y) = (x as i32, y as i32);
        let slot = &mut accumulators[label];
        if slot.is_none() {
            *slot = Some(Accumulator::new(x, y));
            first_seen.push(label);
        }
        if let Some(acc) = slot.as_mut() {
            acc.add(x, y);
        }
    }

    let total = first_seen.len();
    let shapes: Vec<Shape> = first_seen
        .into_iter()
        .filter_map(|label| accumulators[label].take())
        .map(Accumulator::into_shape)
        .filter(|shape| shape.bbox.area() >= config.min_area)
        .collect();

    debug!(
        components = total,
        kept = shapes.len(),
        min_area = config.min_area,
        "Shapes extracted"
    );
    shapes
}

/// Unclassified segments, one per shape.
pub fn shapes_to_segments(shapes: &[Shape]) -> Vec<Segment> {
    shapes.iter().map(Shape::to_segment).collect()
}
