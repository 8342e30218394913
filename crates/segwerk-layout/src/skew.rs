// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Skew estimation from the orientation of text-line fragments.
//
// Known limitation: when the two largest angle clusters are comparable in
// size but not roughly orthogonal, the page is reported as unskewed. Such
// pages may still be rotated.

use segwerk_core::config::{ExtractConfig, SkewConfig};
use tracing::{debug, info, instrument, warn};

use crate::bitmap::Bitmap;
use crate::extract::{Shape, extract_shapes};
use crate::geometry::normalize_quarter_turn;
use crate::smear::smear_horizontal;

/// Outcome of one skew measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewEstimate {
    /// Page rotation in degrees within [-45, 45]. Positive is clockwise on
    /// screen (y axis down).
    pub angle: f64,
    /// False when no usable evidence was found; `angle` is then 0.
    pub reliable: bool,
    /// Number of text-line fragments that voted.
    pub samples: usize,
}

impl SkewEstimate {
    /// Fail-safe value: no rotation.
    pub fn unreliable(samples: usize) -> Self {
        Self {
            angle: 0.0,
            reliable: false,
            samples,
        }
    }

    /// Whether the estimate warrants rotating the page.
    pub fn is_material(&self, threshold: f64) -> bool {
        self.reliable && self.angle.abs() > threshold
    }
}

/// A run of angles within tolerance of their running mean.
#[derive(Debug, Clone)]
struct Cluster {
    sum: f64,
    count: usize,
}

impl Cluster {
    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Smear `bitmap` lightly, extract shapes, and estimate the page angle.
#[instrument(skip(bitmap, config), fields(width = bitmap.width(), height = bitmap.height()))]
pub fn estimate_page_skew(bitmap: &Bitmap, config: &SkewConfig) -> SkewEstimate {
    let smeared = smear_horizontal(bitmap, config.smear_constraint, true);
    let extract = ExtractConfig {
        connectivity: config.connectivity,
        min_area: config.min_area,
    };
    let shapes = extract_shapes(&smeared, &extract);
    estimate_skew(&shapes, config)
}

/// Estimate the page angle from pre-merge shapes.
pub fn estimate_skew(shapes: &[Shape], config: &SkewConfig) -> SkewEstimate {
    let angles: Vec<f64> = shapes
        .iter()
        .filter(|s| s.bbox.height() as f64 <= s.bbox.width() as f64 * config.max_height_ratio)
        .map(|s| s.rotated.long_edge_angle())
        .collect();
    estimate_from_angles(&angles, config)
}

/// Cluster long-edge angles (degrees) and pick the page angle.
pub fn estimate_from_angles(angles: &[f64], config: &SkewConfig) -> SkewEstimate {
    let samples = angles.len();
    if samples == 0 {
        warn!("No text-line fragments found; assuming no skew");
        return SkewEstimate::unreliable(0);
    }

    let mut clusters = cluster_angles(angles, config.cluster_tolerance);
    // Largest first; ties broken toward the smaller magnitude for determinism.
    clusters.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.mean().abs().total_cmp(&b.mean().abs()))
    });
    debug!(
        samples,
        clusters = clusters.len(),
        largest = clusters[0].count,
        "Skew angles clustered"
    );

    let major = &clusters[0];
    let minor_is_negligible = clusters
        .get(1)
        .is_none_or(|second| (second.count as f64) < major.count as f64 * config.minor_cluster_ratio);

    let angle = if minor_is_negligible {
        normalize_quarter_turn(major.mean())
    } else {
        let (m1, m2) = (major.mean(), clusters[1].mean());
        let separation = (m1 - m2).abs();
        if (separation - 90.0).abs() > config.orthogonal_tolerance {
            warn!(
                first = m1,
                second = m2,
                "Competing skew clusters are not orthogonal; assuming no skew"
            );
            return SkewEstimate::unreliable(samples);
        }
        let closer = if m1.abs() <= m2.abs() { m1 } else { m2 };
        normalize_quarter_turn(closer)
    };

    info!(angle, samples, "Skew estimated");
    SkewEstimate {
        angle,
        reliable: true,
        samples,
    }
}

fn cluster_angles(angles: &[f64], tolerance: f64) -> Vec<Cluster> {
    let mut sorted = angles.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut clusters: Vec<Cluster> = Vec::new();
    for angle in sorted {
        match clusters.last_mut() {
            Some(current) if (angle - current.mean()).abs() <= tolerance => {
                current.sum += angle;
                current.count += 1;
            }
            _ => clusters.push(Cluster {
                sum: angle,
                count: 1,
            }),
        }
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SkewConfig {
        SkewConfig::default()
    }

    #[test]
    fn single_cluster_mean() {
        let angles = [1.0, 1.2, 0.8, 1.1, 0.9];
        let est = estimate_from_angles(&angles, &config());
        assert!(est.reliable);
        assert!((est.angle - 1.0).abs() < 1e-9);
        assert_eq!(est.samples, 5);
    }

    #[test]
    fn small_outlier_cluster_ignored() {
        let mut angles = vec![-2.0; 30];
        angles.push(40.0);
        angles.push(40.5);
        let est = estimate_from_angles(&angles, &config());
        assert!(est.reliable);
        assert!((est.angle + 2.0).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_clusters_pick_the_one_near_zero() {
        let mut angles = vec![88.5; 10];
        angles.extend(vec![-1.5; 8]);
        let est = estimate_from_angles(&angles, &config());
        assert!(est.reliable);
        assert!((est.angle + 1.5).abs() < 1e-9, "got {}", est.angle);
    }

    #[test]
    fn non_orthogonal_clusters_fall_back_to_zero() {
        let mut angles = vec![5.0; 10];
        angles.extend(vec![30.0; 9]);
        let est = estimate_from_angles(&angles, &config());
        assert!(!est.reliable);
        assert_eq!(est.angle, 0.0);
    }

    #[test]
    fn large_angle_is_normalised() {
        let est = estimate_from_angles(&[87.0, 87.5, 86.5], &config());
        assert!((est.angle + 3.0).abs() < 1e-9);
    }

    #[test]
    fn no_evidence_is_unreliable() {
        let est = estimate_from_angles(&[], &config());
        assert_eq!(est, SkewEstimate::unreliable(0));
        assert!(!est.is_material(0.2));
    }

    #[test]
    fn materiality_threshold() {
        let est = SkewEstimate {
            angle: -0.3,
            reliable: true,
            samples: 4,
        };
        assert!(est.is_material(0.2));
        assert!(!est.is_material(0.5));
    }

    #[test]
    fn level_text_lines_measure_zero() {
        // Five 300 x 8 "lines".
        let bmp = Bitmap::from_fn(400, 200, |x, y| {
            (20..320).contains(&x) && (y % 30) < 8 && y < 150
        });
        let est = estimate_page_skew(&bmp, &config());
        assert!(est.reliable);
        assert_eq!(est.samples, 5);
        assert!(est.angle.abs() < 1e-9);
    }

    #[test]
    fn fragments_below_min_area_do_not_vote() {
        let bmp = Bitmap::from_fn(400, 200, |x, y| {
            (20..320).contains(&x) && (y % 30) < 8 && y < 150
        });
        let config = SkewConfig {
            min_area: 3000,
            ..SkewConfig::default()
        };
        let est = estimate_page_skew(&bmp, &config);
        assert!(!est.reliable);
        assert_eq!(est.samples, 0);
    }

    #[test]
    fn slanted_text_lines_measure_their_slope() {
        // Lines descending 1 px every 40 px: atan(1/40) ~ 1.43 degrees.
        let bmp = Bitmap::from_fn(600, 300, |x, y| {
            if !(20..580).contains(&x) {
                return false;
            }
            let shifted = y as i64 - (x as i64 / 40);
            shifted >= 0 && shifted < 240 && shifted % 40 < 6
        });
        let est = estimate_page_skew(&bmp, &config());
        assert!(est.reliable);
        let expected = (1.0f64 / 40.0).atan().to_degrees();
        assert!(
            (est.angle - expected).abs() < 0.3,
            "measured {} expected {expected}",
            est.angle
        );
    }
}
