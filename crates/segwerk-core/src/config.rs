// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout engine configuration. Every tunable the pipeline uses lives here so
// callers can override it from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SegwerkError};
use crate::types::{BinarizationMethod, Connectivity};

/// All tunables for one page analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Page binarization used before smearing.
    pub binarization: BinarizationMethod,
    /// Segmentation smear.
    pub smear: SmearConfig,
    /// Connected shape extraction.
    pub extract: ExtractConfig,
    /// Skew estimation and the single-shot correction.
    pub skew: SkewConfig,
    /// Ruled-line removal.
    pub lines: LineConfig,
    /// Segment merger tolerances.
    pub merge: MergeConfig,
    /// Reading-order row band.
    pub order: OrderConfig,
    /// Region classifier thresholds.
    pub classify: ClassifyConfig,
}

/// Constraints for the segmentation CRLA, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmearConfig {
    /// Longest horizontal background gap bridged in the first pass.
    pub horizontal: u32,
    /// Longest vertical background gap bridged.
    pub vertical: u32,
    /// Horizontal gap bridged after the horizontal/vertical AND.
    pub final_horizontal: u32,
}

impl Default for SmearConfig {
    fn default() -> Self {
        Self {
            horizontal: 60,
            vertical: 40,
            final_horizontal: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub connectivity: Connectivity,
    /// Components whose bounding box covers fewer pixels are dropped as noise.
    pub min_area: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Eight,
            min_area: 8,
        }
    }
}

/// Skew estimation parameters. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkewConfig {
    pub enabled: bool,
    /// Horizontal smear applied before looking for text-line fragments.
    pub smear_constraint: u32,
    /// Connectivity used when extracting text-line fragments.
    pub connectivity: Connectivity,
    /// Fragments whose bounding box covers fewer pixels are ignored.
    pub min_area: u64,
    /// A shape counts as a text-line fragment when height <= width * ratio.
    pub max_height_ratio: f64,
    /// Angles within this distance of a cluster's mean join it.
    pub cluster_tolerance: f64,
    /// The runner-up cluster is ignored when smaller than this fraction of
    /// the largest one.
    pub minor_cluster_ratio: f64,
    /// Allowed deviation from 90 degrees between two competing clusters.
    pub orthogonal_tolerance: f64,
    /// Estimates at or below this magnitude do not trigger a rotation.
    pub materiality: f64,
}

impl Default for SkewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smear_constraint: 20,
            connectivity: Connectivity::Eight,
            min_area: 8,
            max_height_ratio: 0.2,
            cluster_tolerance: 2.0,
            minor_cluster_ratio: 0.1,
            orthogonal_tolerance: 2.0,
            materiality: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    pub enabled: bool,
    /// Foreground runs shorter than this are erased before looking for rules.
    pub smear_constraint: u32,
    pub connectivity: Connectivity,
    pub min_area: u64,
    /// Short-side / long-side ratio below which a shape is a ruled line.
    pub max_eccentricity: f64,
    /// Mask dilation radius in pixels (chessboard norm).
    pub dilation: u8,
    /// Also look for vertical rules.
    pub detect_vertical: bool,
    /// Report removed rules as border segments on the page.
    pub keep_as_borders: bool,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smear_constraint: 60,
            connectivity: Connectivity::Eight,
            min_area: 50,
            max_eccentricity: 0.17,
            dilation: 2,
            detect_vertical: true,
            keep_as_borders: true,
        }
    }
}

/// Segment merger tolerances, in pixels unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Conservative pass: largest vertical gap between merged boxes.
    pub vertical_tolerance: u32,
    /// Conservative pass: slack allowed on horizontal containment.
    pub horizontal_tolerance: u32,
    /// Conservative pass: minimum narrower/wider width ratio.
    pub width_ratio: f64,
    /// Bold pass: bottom-left alignment slack.
    pub bold_tolerance: u32,
    /// Upper bound on repetitions of the full four-pass sequence.
    pub max_rounds: u32,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            vertical_tolerance: 12,
            horizontal_tolerance: 24,
            width_ratio: 0.97,
            bold_tolerance: 24,
            max_rounds: 64,
        }
    }
}

/// Reading-order sorting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Objects whose top edges lie within this many pixels of a row's
    /// topmost object share that row and are read left to right.
    pub row_tolerance: u32,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self { row_tolerance: 20 }
    }
}

/// Scanline-correlation thresholds for region classification.
///
/// These values were tuned empirically and have no derivation; treat them as
/// calibration points. The band means of uniform noise shrink roughly with
/// the square root of the region width, so under the defaults noise reads as
/// a photo only in narrow regions (about 128 px or less); wider noisy regions
/// fall through to drawing. Coarser textures such as blocky halftone cells
/// keep a stronger negative band and stay photos in wider regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Fraction of sorted correlations averaged at each end.
    pub band: f64,
    pub text_upper_mean: f64,
    pub text_diff: f64,
    pub photo_lower_mean: f64,
    pub photo_diff: f64,
}

pub const DEFAULT_CORRELATION_BAND: f64 = 0.3;
pub const DEFAULT_TEXT_UPPER_MEAN: f64 = 0.7;
pub const DEFAULT_TEXT_DIFF: f64 = 0.40;
pub const DEFAULT_PHOTO_LOWER_MEAN: f64 = -0.1;
pub const DEFAULT_PHOTO_DIFF: f64 = 0.5;

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            band: DEFAULT_CORRELATION_BAND,
            text_upper_mean: DEFAULT_TEXT_UPPER_MEAN,
            text_diff: DEFAULT_TEXT_DIFF,
            photo_lower_mean: DEFAULT_PHOTO_LOWER_MEAN,
            photo_diff: DEFAULT_PHOTO_DIFF,
        }
    }
}

impl LayoutConfig {
    /// Parse a (possibly partial) JSON configuration. Missing fields keep
    /// their defaults. The result is validated.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Reject values that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<()> {
        match self.binarization {
            BinarizationMethod::Sauvola { window, .. } | BinarizationMethod::Niblack { window, .. }
                if window == 0 =>
            {
                return Err(invalid("binarization window must be positive"));
            }
            _ => {}
        }

        let skew = &self.skew;
        if !(skew.max_height_ratio > 0.0 && skew.max_height_ratio <= 1.0) {
            return Err(invalid("skew.max_height_ratio must be in (0, 1]"));
        }
        if !(skew.minor_cluster_ratio >= 0.0 && skew.minor_cluster_ratio <= 1.0) {
            return Err(invalid("skew.minor_cluster_ratio must be in [0, 1]"));
        }
        if skew.cluster_tolerance < 0.0 || skew.orthogonal_tolerance < 0.0 || skew.materiality < 0.0
        {
            return Err(invalid("skew tolerances must not be negative"));
        }

        if !(self.lines.max_eccentricity > 0.0 && self.lines.max_eccentricity <= 1.0) {
            return Err(invalid("lines.max_eccentricity must be in (0, 1]"));
        }

        if !(self.merge.width_ratio > 0.0 && self.merge.width_ratio <= 1.0) {
            return Err(invalid("merge.width_ratio must be in (0, 1]"));
        }
        if self.merge.max_rounds == 0 {
            return Err(invalid("merge.max_rounds must be positive"));
        }

        let band = self.classify.band;
        if !(band > 0.0 && band <= 0.5) {
            return Err(invalid("classify.band must be in (0, 0.5]"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> SegwerkError {
    SegwerkError::InvalidConfig(message.to_owned())
}
