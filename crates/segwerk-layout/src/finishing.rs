// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Finishing plan: per-content-type rendering of a segmented page.
//
// Each content type maps to a `RegionFinisher` chosen by the caller. The
// plan crops every segment out of the page image, finishes it, and pastes
// the result onto a white canvas; pixels outside all segments stay white.

use std::collections::BTreeMap;
use std::fmt;

use image::{GrayImage, Luma, imageops};
use segwerk_core::error::Result;
use segwerk_core::{BinarizationMethod, ContentType};
use tracing::{debug, info, instrument};

use crate::bitmap::binarize;
use crate::image::crop;
use crate::segment::SegmentedPage;

/// Turns the grayscale crop of one region into its finished pixels.
///
/// Implementations must return an image with the crop's dimensions.
pub trait RegionFinisher: Send + Sync {
    fn finish(&self, region: &GrayImage) -> GrayImage;

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// Black-and-white output through one of the binarization methods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binarize(pub BinarizationMethod);

impl RegionFinisher for Binarize {
    fn finish(&self, region: &GrayImage) -> GrayImage {
        binarize(region, &self.0).to_luma()
    }

    fn name(&self) -> &str {
        match self.0 {
            BinarizationMethod::Otsu => "otsu",
            BinarizationMethod::Sauvola { .. } => "sauvola",
            BinarizationMethod::Niblack { .. } => "niblack",
            BinarizationMethod::LocalMean { .. } => "local_mean",
            BinarizationMethod::Dither => "dither",
        }
    }
}

/// Keeps the grayscale pixels unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grayscale;

impl RegionFinisher for Grayscale {
    fn finish(&self, region: &GrayImage) -> GrayImage {
        region.clone()
    }

    fn name(&self) -> &str {
        "grayscale"
    }
}

/// Paints the region white.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blank;

impl RegionFinisher for Blank {
    fn finish(&self, region: &GrayImage) -> GrayImage {
        GrayImage::from_pixel(region.width(), region.height(), Luma([255u8]))
    }

    fn name(&self) -> &str {
        "blank"
    }
}

/// Mapping from content type to finisher.
pub struct FinishingPlan {
    finishers: BTreeMap<ContentType, Box<dyn RegionFinisher>>,
}

impl FinishingPlan {
    /// A plan with no finishers: every region renders white.
    pub fn empty() -> Self {
        Self {
            finishers: BTreeMap::new(),
        }
    }

    /// Text through Sauvola, photos dithered, drawings and unclassified
    /// regions through Otsu, borders blanked.
    pub fn standard() -> Self {
        Self::empty()
            .with(ContentType::Text, Binarize(BinarizationMethod::default()))
            .with(ContentType::Photo, Binarize(BinarizationMethod::Dither))
            .with(ContentType::Drawing, Binarize(BinarizationMethod::Otsu))
            .with(ContentType::Unknown, Binarize(BinarizationMethod::Otsu))
            .with(ContentType::Border, Blank)
    }

    /// Use `finisher` for `content`, replacing any previous choice.
    pub fn with(mut self, content: ContentType, finisher: impl RegionFinisher + 'static) -> Self {
        self.finishers.insert(content, Box::new(finisher));
        self
    }

    pub fn without(mut self, content: ContentType) -> Self {
        self.finishers.remove(&content);
        self
    }

    pub fn finisher(&self, content: ContentType) -> Option<&dyn RegionFinisher> {
        self.finishers.get(&content).map(|f| f.as_ref())
    }

    /// Render `page` onto a white canvas of the page's size. Segments are
    /// painted in page order, so a later segment wins where two overlap.
    #[instrument(skip(self, page), fields(width = page.width(), height = page.height(), segments = page.len()))]
    pub fn render(&self, page: &SegmentedPage) -> Result<GrayImage> {
        let mut canvas = GrayImage::from_pixel(page.width(), page.height(), Luma([255u8]));
        let mut painted = 0usize;

        for segment in page.segments() {
            let Some(finisher) = self.finisher(segment.content) else {
                continue;
            };
            let region = crop(page.image(), &segment.bbox)?;
            let finished = finisher.finish(&region);
            debug!(
                content = %segment.content,
                finisher = finisher.name(),
                x = segment.bbox.x1(),
                y = segment.bbox.y1(),
                "Region finished"
            );
            imageops::replace(
                &mut canvas,
                &finished,
                i64::from(segment.bbox.x1()),
                i64::from(segment.bbox.y1()),
            );
            painted += 1;
        }

        info!(painted, "Page rendered");
        Ok(canvas)
    }
}

impl Default for FinishingPlan {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for FinishingPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.finishers.iter().map(|(k, v)| (k, v.name())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::segment::Segment;

    struct Invert;

    impl RegionFinisher for Invert {
        fn finish(&self, region: &GrayImage) -> GrayImage {
            let mut out = region.clone();
            imageops::invert(&mut out);
            out
        }

        fn name(&self) -> &str {
            "invert"
        }
    }

    fn page() -> SegmentedPage {
        let gray = GrayImage::from_fn(40, 30, |x, _| Luma([if x < 20 { 60u8 } else { 200u8 }]));
        let mut page = SegmentedPage::new(gray, None);
        page.push(Segment::with_content(BoundingBox::new(0, 0, 9, 9), ContentType::Drawing));
        page.push(Segment::with_content(BoundingBox::new(20, 0, 29, 9), ContentType::Border));
        page.push(Segment::with_content(BoundingBox::new(10, 20, 29, 29), ContentType::Text));
        page
    }

    #[test]
    fn standard_plan_covers_every_type() {
        let plan = FinishingPlan::standard();
        for content in ContentType::ALL {
            assert!(plan.finisher(content).is_some(), "{content} has no finisher");
        }
        assert_eq!(plan.finisher(ContentType::Photo).unwrap().name(), "dither");
        assert_eq!(plan.finisher(ContentType::Border).unwrap().name(), "blank");
    }

    #[test]
    fn empty_plan_renders_white() {
        let out = FinishingPlan::empty().render(&page()).unwrap();
        assert!(out.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn custom_finisher_is_used_for_its_type_only() {
        let plan = FinishingPlan::empty().with(ContentType::Drawing, Invert);
        let out = plan.render(&page()).unwrap();
        assert_eq!(out.get_pixel(5, 5)[0], 255 - 60);
        // Outside the drawing: still white.
        assert_eq!(out.get_pixel(15, 5)[0], 255);
        assert_eq!(out.get_pixel(15, 25)[0], 255);
    }

    #[test]
    fn grayscale_copies_pixels_and_borders_blank() {
        let plan = FinishingPlan::empty()
            .with(ContentType::Text, Grayscale)
            .with(ContentType::Border, Blank);
        let out = plan.render(&page()).unwrap();
        assert_eq!(out.get_pixel(12, 25)[0], 60);
        assert_eq!(out.get_pixel(25, 25)[0], 200);
        assert_eq!(out.get_pixel(25, 5)[0], 255);
    }

    #[test]
    fn without_drops_a_type() {
        let plan = FinishingPlan::standard().without(ContentType::Text);
        assert!(plan.finisher(ContentType::Text).is_none());
        assert!(plan.finisher(ContentType::Photo).is_some());
    }

    #[test]
    fn segment_outside_image_fails() {
        let mut page = SegmentedPage::new(GrayImage::new(10, 10), None);
        page.push(Segment::with_content(BoundingBox::new(5, 5, 12, 8), ContentType::Text));
        assert!(FinishingPlan::standard().render(&page).is_err());
    }
}
