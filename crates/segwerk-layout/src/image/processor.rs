// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page image loading and pixel-level helpers: decode, grayscale, deskew,
// crop, and PNG output. Operates on in-memory images using the `image` and
// `imageproc` crates.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, Luma, imageops};
use imageproc::geometric_transformations::{self, Interpolation};
use segwerk_core::error::{Result, SegwerkError};
use tracing::{debug, info, instrument};

use crate::geometry::BoundingBox;

/// A decoded page, ready for analysis.
///
/// ```ignore
/// let page = PageImage::open("scan.png")?;
/// let gray = page.to_gray();
/// ```
pub struct PageImage {
    image: DynamicImage,
}

impl PageImage {
    // -- Construction ---------------------------------------------------------

    /// Load a page from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let image = image::open(path.as_ref()).map_err(|err| {
            SegwerkError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = image.width(), height = image.height(), "Page loaded");
        Ok(Self { image })
    }

    /// Decode a page from encoded bytes (PNG, JPEG, TIFF, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data)
            .map_err(|err| SegwerkError::ImageError(format!("failed to decode page: {}", err)))?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Page decoded from bytes"
        );
        Ok(Self { image })
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Luma conversion of the page.
    pub fn to_gray(&self) -> GrayImage {
        self.image.to_luma8()
    }
}

/// Rotate `gray` by `-degrees` about its centre so that a page measured as
/// skewed by `degrees` becomes level. Uncovered corners are filled white and
/// the canvas keeps its size.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn deskew(gray: &GrayImage, degrees: f64) -> GrayImage {
    info!(degrees, "Deskewing page");
    let radians = (-degrees).to_radians() as f32;
    geometric_transformations::rotate_about_center(
        gray,
        radians,
        Interpolation::Bilinear,
        Luma([255u8]),
    )
}

/// Copy `region` out of `gray`. Fails when the region leaves the image.
pub fn crop(gray: &GrayImage, region: &BoundingBox) -> Result<GrayImage> {
    let inside = region.x1() >= 0
        && region.y1() >= 0
        && i64::from(region.x2()) < i64::from(gray.width())
        && i64::from(region.y2()) < i64::from(gray.height());
    if !inside {
        return Err(SegwerkError::InvalidRegion(format!(
            "{region:?} outside {}x{} image",
            gray.width(),
            gray.height()
        )));
    }
    Ok(imageops::crop_imm(
        gray,
        region.x1() as u32,
        region.y1() as u32,
        region.width(),
        region.height(),
    )
    .to_image())
}

/// Encode `gray` as PNG bytes.
pub fn to_png_bytes(gray: &GrayImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    gray.write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| SegwerkError::ImageError(format!("PNG encoding failed: {}", err)))?;
    Ok(buffer)
}

/// Write `gray` to `path`; the format follows the extension.
pub fn save(gray: &GrayImage, path: impl AsRef<Path>) -> Result<()> {
    gray.save(path.as_ref()).map_err(|err| {
        SegwerkError::ImageError(format!(
            "failed to save image to {}: {}",
            path.as_ref().display(),
            err
        ))
    })
}
