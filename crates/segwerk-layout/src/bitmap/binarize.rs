// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binarization: global Otsu threshold, local adaptive thresholds (Sauvola,
// Niblack, local mean) backed by integral images, and error-diffusion
// dithering. Every mode returns a bitmap with the input's dimensions.

use image::GrayImage;
use image::imageops::{self, BiLevel};
use segwerk_core::BinarizationMethod;
use tracing::{debug, instrument};

use super::Bitmap;

/// Dynamic range of the standard deviation in Sauvola's formula.
const SAUVOLA_RANGE: f64 = 128.0;

/// Binarize `gray` with the selected method.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn binarize(gray: &GrayImage, method: &BinarizationMethod) -> Bitmap {
    match *method {
        BinarizationMethod::Otsu => global_threshold(gray),
        BinarizationMethod::Sauvola { window, k } => sauvola(gray, window, k),
        BinarizationMethod::Niblack { window, k } => niblack(gray, window, k),
        BinarizationMethod::LocalMean { radius, c } => local_mean(gray, radius, c),
        BinarizationMethod::Dither => dither(gray),
    }
}

/// Global threshold chosen by Otsu's method. Pixels at or below the threshold
/// are ink. A page without a usable split (one intensity only) comes back as
/// all background.
pub fn global_threshold(gray: &GrayImage) -> Bitmap {
    match otsu_threshold(gray) {
        Some(threshold) => {
            debug!(threshold, "Otsu threshold computed");
            Bitmap::from_fn(gray.width(), gray.height(), |x, y| {
                gray.get_pixel(x, y).0[0] <= threshold
            })
        }
        None => {
            debug!("Zero-variance input; treating everything as background");
            Bitmap::new(gray.width(), gray.height())
        }
    }
}

/// Sauvola adaptive threshold over a `window` x `window` neighbourhood.
pub fn sauvola(gray: &GrayImage, window: u32, k: f64) -> Bitmap {
    let stats = WindowStats::new(gray);
    let radius = window.max(1) / 2;
    Bitmap::from_fn(gray.width(), gray.height(), |x, y| {
        let (mean, std) = stats.mean_std(x, y, radius);
        let threshold = mean * (1.0 + k * (std / SAUVOLA_RANGE - 1.0));
        (gray.get_pixel(x, y).0[0] as f64) < threshold
    })
}

/// Niblack adaptive threshold over a `window` x `window` neighbourhood.
pub fn niblack(gray: &GrayImage, window: u32, k: f64) -> Bitmap {
    let stats = WindowStats::new(gray);
    let radius = window.max(1) / 2;
    Bitmap::from_fn(gray.width(), gray.height(), |x, y| {
        let (mean, std) = stats.mean_std(x, y, radius);
        (gray.get_pixel(x, y).0[0] as f64) < mean + k * std
    })
}

/// Local mean threshold: a pixel is ink when darker than the mean of its
/// `radius` neighbourhood minus `c`.
pub fn local_mean(gray: &GrayImage, radius: u32, c: i32) -> Bitmap {
    let stats = WindowStats::new(gray);
    Bitmap::from_fn(gray.width(), gray.height(), |x, y| {
        let (mean, _) = stats.mean_std(x, y, radius);
        let threshold = (mean as i32 - c).clamp(0, 255);
        (gray.get_pixel(x, y).0[0] as i32) < threshold
    })
}

/// Floyd-Steinberg error diffusion to black and white. Not adaptive.
pub fn dither(gray: &GrayImage) -> Bitmap {
    let mut work = gray.clone();
    imageops::dither(&mut work, &BiLevel);
    Bitmap::from_fn(work.width(), work.height(), |x, y| work.get_pixel(x, y).0[0] == 0)
}

/// Otsu threshold for a grayscale image.
///
/// Returns the intensity `t` maximising the between-class variance of the
/// classes `[0, t]` and `(t, 255]`, or `None` when no split separates two
/// non-empty classes.
pub fn otsu_threshold(gray: &GrayImage) -> Option<u8> {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total_pixels = gray.width() as u64 * gray.height() as u64;
    if total_pixels == 0 {
        return None;
    }

    let mut sum_total: f64 = 0.0;
    for (i, &count) in histogram.iter().enumerate() {
        sum_total += i as f64 * count as f64;
    }

    let mut sum_dark: f64 = 0.0;
    let mut weight_dark: u64 = 0;
    let mut max_variance: f64 = 0.0;
    let mut best_threshold = None;

    for (t, &count) in histogram.iter().enumerate() {
        weight_dark += count;
        if weight_dark == 0 {
            continue;
        }
        let weight_light = total_pixels - weight_dark;
        if weight_light == 0 {
            break;
        }

        sum_dark += t as f64 * count as f64;
        let mean_dark = sum_dark / weight_dark as f64;
        let mean_light = (sum_total - sum_dark) / weight_light as f64;

        let between_variance =
            weight_dark as f64 * weight_light as f64 * (mean_dark - mean_light).powi(2);

        if between_variance > max_variance {
            max_variance = between_variance;
            best_threshold = Some(t as u8);
        }
    }

    best_threshold
}

// -- Integral image helpers ---------------------------------------------------

/// Summed-area tables of pixel values and squared pixel values.
///
/// `sum[y * (width+1) + x]` holds the sum over the rectangle [0, 0) to (x, y)
/// (exclusive on both axes). Both tables are `(width+1) x (height+1)` with a
/// zero-padded border.
struct WindowStats {
    width: u32,
    height: u32,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl WindowStats {
    fn new(gray: &GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let stride = (w + 1) as usize;
        let mut sum = vec![0u64; stride * (h + 1) as usize];
        let mut sum_sq = vec![0u64; stride * (h + 1) as usize];

        for y in 0..h {
            let mut row_sum: u64 = 0;
            let mut row_sq: u64 = 0;
            for x in 0..w {
                let v = gray.get_pixel(x, y).0[0] as u64;
                row_sum += v;
                row_sq += v * v;
                let idx = (y + 1) as usize * stride + (x + 1) as usize;
                let above = y as usize * stride + (x + 1) as usize;
                sum[idx] = row_sum + sum[above];
                sum_sq[idx] = row_sq + sum_sq[above];
            }
        }

        Self {
            width: w,
            height: h,
            sum,
            sum_sq,
        }
    }

    /// Mean and standard deviation of the square of the given radius centred
    /// on (cx, cy), clamped to the image.
    fn mean_std(&self, cx: u32, cy: u32, radius: u32) -> (f64, f64) {
        let stride = (self.width + 1) as usize;

        let x1 = cx.saturating_sub(radius) as usize;
        let y1 = cy.saturating_sub(radius) as usize;
        let x2 = (cx as usize + radius as usize + 1).min(self.width as usize);
        let y2 = (cy as usize + radius as usize + 1).min(self.height as usize);

        let area = ((x2 - x1) * (y2 - y1)) as f64;
        if area == 0.0 {
            return (128.0, 0.0);
        }

        let lookup = |table: &[u64]| {
            table[y2 * stride + x2] as f64 - table[y1 * stride + x2] as f64
                - table[y2 * stride + x1] as f64
                + table[y1 * stride + x1] as f64
        };

        let mean = lookup(&self.sum) / area;
        let variance = (lookup(&self.sum_sq) / area - mean * mean).max(0.0);
        (mean, variance.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Dark text-like strokes on a light background.
    fn strokes() -> GrayImage {
        GrayImage::from_fn(60, 40, |x, y| {
            if (10..14).contains(&y) && (5..55).contains(&x) {
                Luma([20u8])
            } else if (25..29).contains(&y) && (5..40).contains(&x) {
                Luma([35u8])
            } else {
                Luma([230u8])
            }
        })
    }

    #[test]
    fn otsu_splits_bimodal_histogram() {
        let t = otsu_threshold(&strokes()).expect("bimodal input has a threshold");
        assert!((35..230).contains(&t), "threshold {t} should separate the modes");
    }

    #[test]
    fn otsu_uniform_image_is_all_background() {
        let gray = GrayImage::from_pixel(30, 20, Luma([128u8]));
        assert_eq!(otsu_threshold(&gray), None);
        let bmp = global_threshold(&gray);
        assert_eq!((bmp.width(), bmp.height()), (30, 20));
        assert_eq!(bmp.foreground_count(), 0);
    }

    #[test]
    fn every_mode_preserves_dimensions() {
        let gray = strokes();
        let methods = [
            BinarizationMethod::Otsu,
            BinarizationMethod::Sauvola { window: 15, k: 0.2 },
            BinarizationMethod::Niblack { window: 15, k: -0.2 },
            BinarizationMethod::LocalMean { radius: 7, c: 10 },
            BinarizationMethod::Dither,
        ];
        for method in methods {
            let bmp = binarize(&gray, &method);
            assert_eq!((bmp.width(), bmp.height()), (60, 40), "{method:?}");
        }
    }

    #[test]
    fn global_threshold_marks_strokes() {
        let bmp = global_threshold(&strokes());
        assert!(bmp.get(20, 11));
        assert!(bmp.get(20, 26));
        assert!(!bmp.get(20, 35));
        assert_eq!(bmp.foreground_count(), 50 * 4 + 35 * 4);
    }

    #[test]
    fn sauvola_marks_strokes_and_keeps_paper_clean() {
        let bmp = sauvola(&strokes(), 15, 0.2);
        assert!(bmp.get(30, 12));
        assert!(!bmp.get(30, 35));
        assert!(!bmp.get(2, 2));
    }

    #[test]
    fn sauvola_uniform_image_is_background() {
        let gray = GrayImage::from_pixel(20, 20, Luma([200u8]));
        assert_eq!(sauvola(&gray, 9, 0.3).foreground_count(), 0);
        assert_eq!(niblack(&gray, 9, -0.2).foreground_count(), 0);
    }

    #[test]
    fn dither_extremes() {
        let black = GrayImage::from_pixel(8, 8, Luma([0u8]));
        let white = GrayImage::from_pixel(8, 8, Luma([255u8]));
        assert_eq!(dither(&black).foreground_count(), 64);
        assert_eq!(dither(&white).foreground_count(), 0);
    }

    #[test]
    fn window_stats_mean_and_std() {
        let gray = GrayImage::from_fn(4, 1, |x, _| Luma([if x % 2 == 0 { 0u8 } else { 100u8 }]));
        let stats = WindowStats::new(&gray);
        let (mean, std) = stats.mean_std(1, 0, 10);
        assert!((mean - 50.0).abs() < 1e-9);
        assert!((std - 50.0).abs() < 1e-9);
    }
}
