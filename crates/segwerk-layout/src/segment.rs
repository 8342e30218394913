// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Segments and the segmented page handed to finishing.

use image::GrayImage;
use segwerk_core::{ContentType, Resolution};
use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// A page region and what it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub bbox: BoundingBox,
    pub content: ContentType,
}

impl Segment {
    /// Unclassified segment covering `bbox`.
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            content: ContentType::Unknown,
        }
    }

    pub fn with_content(bbox: BoundingBox, content: ContentType) -> Self {
        Self { bbox, content }
    }

    /// Absorb `other`: the box grows to cover both and mismatched tags
    /// degrade to `Unknown`.
    pub fn merge(&mut self, other: &Segment) {
        self.bbox.merge(&other.bbox);
        self.content = self.content.merge(other.content);
    }

    pub fn area(&self) -> u64 {
        self.bbox.area()
    }
}

/// An analyzed page: the image the coordinates refer to, and its segments.
///
/// Segment order is insertion order until [`SegmentedPage::set_reading_order`]
/// installs the sorter's output, after which it is reading order.
#[derive(Debug, Clone)]
pub struct SegmentedPage {
    image: GrayImage,
    segments: Vec<Segment>,
    resolution: Option<Resolution>,
    skew_degrees: f64,
    reading_order: bool,
}

impl SegmentedPage {
    pub fn new(image: GrayImage, resolution: Option<Resolution>) -> Self {
        Self {
            image,
            segments: Vec::new(),
            resolution,
            skew_degrees: 0.0,
            reading_order: false,
        }
    }

    /// Page image (after any deskew) that segment coordinates refer to.
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// Rotation, in degrees, that was measured and corrected before
    /// segmentation. Zero when the page was not rotated.
    pub fn skew_degrees(&self) -> f64 {
        self.skew_degrees
    }

    pub fn set_skew_degrees(&mut self, degrees: f64) {
        self.skew_degrees = degrees;
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut [Segment] {
        &mut self.segments
    }

    /// Append a segment. Invalidates any reading order.
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
        self.reading_order = false;
    }

    /// Install segments already in reading order.
    pub fn set_reading_order(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
        self.reading_order = true;
    }

    pub fn is_reading_order(&self) -> bool {
        self.reading_order
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments with the given tag, in page order.
    pub fn segments_of(&self, content: ContentType) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |s| s.content == content)
    }

    /// Serializable summary, without pixels.
    pub fn report(&self) -> PageReport {
        PageReport {
            width: self.width(),
            height: self.height(),
            resolution: self.resolution,
            skew_degrees: self.skew_degrees,
            reading_order: self.reading_order,
            segments: self.segments.clone(),
        }
    }
}

/// What a [`SegmentedPage`] looks like on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    pub width: u32,
    pub height: u32,
    pub resolution: Option<Resolution>,
    pub skew_degrees: f64,
    pub reading_order: bool,
    pub segments: Vec<Segment>,
}
