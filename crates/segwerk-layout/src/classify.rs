// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region classification by scanline correlation.
//
// Every pair of rows in a binarized crop is scored with
// `1 - (2 / width) * popcount(row_a XOR row_b)`. Text yields a bimodal
// distribution (identical rows inside a line of type, dissimilar rows across
// line gaps); photographs are noisy at every distance; line art sits between.

use image::GrayImage;
use segwerk_core::config::ClassifyConfig;
use segwerk_core::error::Result;
use segwerk_core::ContentType;
use tracing::{debug, info, instrument};

use crate::bitmap::{Bitmap, global_threshold};
use crate::geometry::BoundingBox;
use crate::image::crop;
use crate::segment::SegmentedPage;

/// Summary of a crop's scanline correlation distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationStats {
    /// Mean of the highest `band` fraction of correlations.
    pub upper_mean: f64,
    /// Mean of the lowest `band` fraction of correlations.
    pub lower_mean: f64,
    /// Number of row pairs scored.
    pub samples: usize,
}

impl CorrelationStats {
    pub fn diff(&self) -> f64 {
        self.upper_mean - self.lower_mean
    }
}

/// Correlation of every row pair `(a, b)` with `a < b`.
pub fn scanline_correlations(bitmap: &Bitmap) -> Vec<f64> {
    let (width, height) = (bitmap.width(), bitmap.height());
    if width == 0 || height < 2 {
        return Vec::new();
    }

    let rows: Vec<Vec<u64>> = (0..height).map(|y| bitmap.packed_row(y)).collect();
    let scale = 2.0 / width as f64;
    let pairs = height as usize * (height as usize - 1) / 2;
    let mut out = Vec::with_capacity(pairs);

    for a in 0..rows.len() {
        for b in a + 1..rows.len() {
            let differing: u32 = rows[a]
                .iter()
                .zip(&rows[b])
                .map(|(x, y)| (x ^ y).count_ones())
                .sum();
            out.push(1.0 - scale * differing as f64);
        }
    }
    out
}

/// Upper and lower band means of the correlation distribution, or `None`
/// when the crop has fewer than two rows or no columns.
pub fn correlation_stats(bitmap: &Bitmap, band: f64) -> Option<CorrelationStats> {
    let mut values = scanline_correlations(bitmap);
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let n = values.len();
    let take = ((n as f64 * band).ceil() as usize).clamp(1, n);
    let mean = |slice: &[f64]| slice.iter().sum::<f64>() / slice.len() as f64;

    Some(CorrelationStats {
        upper_mean: mean(&values[n - take..]),
        lower_mean: mean(&values[..take]),
        samples: n,
    })
}

pub struct RegionClassifier {
    config: ClassifyConfig,
}

impl RegionClassifier {
    pub fn new(config: ClassifyConfig) -> Self {
        Self { config }
    }

    /// Apply the decision rule to precomputed statistics.
    pub fn decide(&self, stats: &CorrelationStats) -> ContentType {
        let c = &self.config;
        let diff = stats.diff();
        if stats.upper_mean > c.text_upper_mean && diff > c.text_diff {
            ContentType::Text
        } else if stats.lower_mean < c.photo_lower_mean || diff > c.photo_diff {
            ContentType::Photo
        } else {
            ContentType::Drawing
        }
    }

    /// Classify an already binarized crop. Degenerate crops are drawings.
    pub fn classify_bitmap(&self, bitmap: &Bitmap) -> ContentType {
        match correlation_stats(bitmap, self.config.band) {
            Some(stats) => {
                let content = self.decide(&stats);
                debug!(
                    upper = stats.upper_mean,
                    lower = stats.lower_mean,
                    diff = stats.diff(),
                    samples = stats.samples,
                    %content,
                    "Region classified"
                );
                content
            }
            None => ContentType::Drawing,
        }
    }

    /// Crop `region` out of `gray`, binarize it with Otsu, and classify it.
    pub fn classify_region(&self, gray: &GrayImage, region: &BoundingBox) -> Result<ContentType> {
        let pixels = crop(gray, region)?;
        Ok(self.classify_bitmap(&global_threshold(&pixels)))
    }

    /// Tag every non-border segment of `page`.
    #[instrument(skip(self, page), fields(segments = page.len()))]
    pub fn classify_page(&self, page: &mut SegmentedPage) -> Result<()> {
        let tags = page
            .segments()
            .iter()
            .map(|segment| match segment.content {
                ContentType::Border => Ok(ContentType::Border),
                _ => self.classify_region(page.image(), &segment.bbox),
            })
            .collect::<Result<Vec<_>>>()?;

        for (segment, tag) in page.segments_mut().iter_mut().zip(tags) {
            segment.content = tag;
        }
        info!(
            text = page.segments_of(ContentType::Text).count(),
            photo = page.segments_of(ContentType::Photo).count(),
            drawing = page.segments_of(ContentType::Drawing).count(),
            "Page classified"
        );
        Ok(())
    }
}

impl Default for RegionClassifier {
    fn default() -> Self {
        Self::new(ClassifyConfig::default())
    }
}
