// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page analyzer: the full layout pipeline for one page: binarize, measure
// skew (rotating and re-binarizing at most once), remove ruled lines, smear,
// extract shapes, merge, sort into reading order, and classify.

use std::path::Path;

use image::{DynamicImage, GrayImage};
use segwerk_core::error::{Result, SegwerkError};
use segwerk_core::{ContentType, LayoutConfig, Resolution};
use tracing::{debug, info, instrument, warn};

use crate::bitmap::{Bitmap, binarize};
use crate::classify::RegionClassifier;
use crate::extract::{extract_shapes, shapes_to_segments};
use crate::geometry::Tolerance;
use crate::image::{PageImage, deskew};
use crate::lines::remove_lines;
use crate::merge::SegmentMerger;
use crate::order::sort_reading_order;
use crate::segment::{Segment, SegmentedPage};
use crate::skew::estimate_page_skew;
use crate::smear::crla;

/// Runs layout analysis on single pages.
///
/// The analyzer holds no per-page state, so one instance can serve any number
/// of pages, including from several threads at once.
///
/// ```ignore
/// let analyzer = PageAnalyzer::new(LayoutConfig::default())?;
/// let page = analyzer.analyze_file("scan.png", Some(Resolution::uniform(300)))?;
/// for segment in page.segments() {
///     println!("{:?} {}", segment.bbox, segment.content);
/// }
/// ```
pub struct PageAnalyzer {
    config: LayoutConfig,
    merger: SegmentMerger,
    classifier: RegionClassifier,
}

impl PageAnalyzer {
    // -- Construction ---------------------------------------------------------

    /// Build an analyzer after validating `config`.
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            merger: SegmentMerger::new(config.merge),
            classifier: RegionClassifier::new(config.classify),
            config,
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    // -- Entry points ---------------------------------------------------------

    /// Decode `data` and analyze it.
    pub fn analyze_bytes(&self, data: &[u8], resolution: Option<Resolution>) -> Result<SegmentedPage> {
        let page = PageImage::from_bytes(data)?;
        self.analyze_gray(page.to_gray(), resolution)
    }

    /// Open the image at `path` and analyze it.
    pub fn analyze_file(
        &self,
        path: impl AsRef<Path>,
        resolution: Option<Resolution>,
    ) -> Result<SegmentedPage> {
        let page = PageImage::open(path)?;
        self.analyze_gray(page.to_gray(), resolution)
    }

    pub fn analyze(&self, image: &DynamicImage, resolution: Option<Resolution>) -> Result<SegmentedPage> {
        self.analyze_gray(image.to_luma8(), resolution)
    }

    /// Analyze a grayscale page. The returned page owns the image its segment
    /// coordinates refer to: the deskewed copy when a rotation was applied.
    #[instrument(skip(self, gray, resolution), fields(width = gray.width(), height = gray.height()))]
    pub fn analyze_gray(&self, gray: GrayImage, resolution: Option<Resolution>) -> Result<SegmentedPage> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Err(SegwerkError::EmptyImage { width, height });
        }

        let bitmap = binarize(&gray, &self.config.binarization);
        if bitmap.foreground_count() == 0 {
            warn!("Page has no ink; returning an empty layout");
        }
        let (gray, bitmap, skew) = self.correct_skew(gray, bitmap);

        let segments = self.segment_bitmap(&bitmap);
        let mut page = SegmentedPage::new(gray, resolution);
        page.set_skew_degrees(skew);
        page.set_reading_order(segments);
        self.classifier.classify_page(&mut page)?;

        info!(
            segments = page.len(),
            skew_degrees = skew,
            "Page analyzed"
        );
        Ok(page)
    }

    // -- Stages ---------------------------------------------------------------

    /// Measure skew and, when it is material, rotate and re-binarize once.
    fn correct_skew(&self, gray: GrayImage, bitmap: Bitmap) -> (GrayImage, Bitmap, f64) {
        let skew = &self.config.skew;
        if !skew.enabled {
            return (gray, bitmap, 0.0);
        }

        let estimate = estimate_page_skew(&bitmap, skew);
        if !estimate.is_material(skew.materiality) {
            debug!(angle = estimate.angle, reliable = estimate.reliable, "Skew below materiality");
            return (gray, bitmap, 0.0);
        }

        let rotated = deskew(&gray, estimate.angle);
        let rebinarized = binarize(&rotated, &self.config.binarization);
        info!(angle = estimate.angle, "Page rotated; re-running segmentation");
        (rotated, rebinarized, estimate.angle)
    }

    /// Segmentation on an already binarized, level page: line removal, CRLA,
    /// extraction, merging, border segments, and reading order. The result
    /// is unclassified apart from borders.
    #[instrument(skip(self, bitmap), fields(width = bitmap.width(), height = bitmap.height()))]
    pub fn segment_bitmap(&self, bitmap: &Bitmap) -> Vec<Segment> {
        let lines = &self.config.lines;
        let (smeared, borders) = if lines.enabled {
            let (cleaned, found) = remove_lines(bitmap, lines);
            let borders = if lines.keep_as_borders { found.lines } else { Vec::new() };
            (crla(&cleaned, &self.config.smear), borders)
        } else {
            (crla(bitmap, &self.config.smear), Vec::new())
        };

        let shapes = extract_shapes(&smeared, &self.config.extract);
        debug!(shapes = shapes.len(), "Shapes extracted");

        let mut segments = self.merger.merge(shapes_to_segments(&shapes));
        segments.extend(
            borders
                .into_iter()
                .map(|bbox| Segment::with_content(bbox, ContentType::Border)),
        );
        sort_reading_order(segments, Tolerance::px(self.config.order.row_tolerance))
    }
}
