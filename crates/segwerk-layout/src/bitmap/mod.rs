// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boolean page bitmaps and the binarization modes that produce them.

pub mod binarize;

use image::{GrayImage, Luma};

use crate::geometry::BoundingBox;

pub use binarize::{binarize, dither, global_threshold, local_mean, niblack, otsu_threshold, sauvola};

/// A row-major foreground/background bitmap. `true` is ink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl Bitmap {
    /// All-background bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; width as usize * height as usize],
        }
    }

    /// Build a bitmap by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Interpret a mask image: any non-zero pixel is foreground.
    pub fn from_mask(mask: &GrayImage) -> Self {
        Self {
            width: mask.width(),
            height: mask.height(),
            data: mask.as_raw().iter().map(|&v| v != 0).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Pixel value. Panics when `(x, y)` is outside the bitmap.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.data[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn row(&self, y: u32) -> &[bool] {
        let start = self.index(0, y);
        &self.data[start..start + self.width as usize]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [bool] {
        let start = self.index(0, y);
        let width = self.width as usize;
        &mut self.data[start..start + width]
    }

    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Rotate 90 degrees clockwise. Output is `height` x `width`.
    pub fn rotate90(&self) -> Bitmap {
        let (w, h) = (self.width, self.height);
        // Output pixel (x', y') comes from source (y', h - 1 - x').
        Bitmap::from_fn(h, w, |nx, ny| self.get(ny, h - 1 - nx))
    }

    /// Rotate 90 degrees counter-clockwise. Inverse of [`Bitmap::rotate90`].
    pub fn rotate270(&self) -> Bitmap {
        let (w, h) = (self.width, self.height);
        Bitmap::from_fn(h, w, |nx, ny| self.get(w - 1 - ny, nx))
    }

    /// Copy of the pixels inside `region`, which must lie within the bitmap.
    pub fn crop(&self, region: &BoundingBox) -> Bitmap {
        assert!(
            region.x1() >= 0
                && region.y1() >= 0
                && (region.x2() as i64) < self.width as i64
                && (region.y2() as i64) < self.height as i64,
            "crop region {region:?} outside {}x{} bitmap",
            self.width,
            self.height
        );
        let (x0, y0) = (region.x1() as u32, region.y1() as u32);
        Bitmap::from_fn(region.width(), region.height(), |x, y| {
            self.get(x0 + x, y0 + y)
        })
    }

    /// Clear every pixel that is set in `mask`. Dimensions must match.
    pub fn subtract(&self, mask: &Bitmap) -> Bitmap {
        assert_eq!(
            (self.width, self.height),
            (mask.width, mask.height),
            "mask dimensions differ"
        );
        Bitmap {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&mask.data)
                .map(|(&px, &m)| px && !m)
                .collect(),
        }
    }

    /// Pixel-wise AND. Dimensions must match.
    pub fn and(&self, other: &Bitmap) -> Bitmap {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "bitmap dimensions differ"
        );
        Bitmap {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| a && b)
                .collect(),
        }
    }

    /// Mask image for imageproc: foreground 255, background 0.
    pub fn to_mask(&self) -> GrayImage {
        let raw = self.data.iter().map(|&v| if v { 255u8 } else { 0u8 }).collect();
        // Length always equals width * height.
        GrayImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }

    /// Printable rendering: ink black on white.
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.get(x, y) { Luma([0u8]) } else { Luma([255u8]) }
        })
    }

    /// Pack row `y` into 64-bit words for popcount-based comparisons.
    pub fn packed_row(&self, y: u32) -> Vec<u64> {
        let row = self.row(y);
        let mut words = vec![0u64; row.len().div_ceil(64)];
        for (i, &px) in row.iter().enumerate() {
            if px {
                words[i / 64] |= 1u64 << (i % 64);
            }
        }
        words
    }
}
