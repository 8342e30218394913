// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Segwerk layout engine.

use serde::{Deserialize, Serialize};

/// What a page region contains, as decided by the region classifier.
///
/// Downstream finishing picks a binarization algorithm per variant.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Not yet classified, or the result of merging two differently-typed regions.
    #[default]
    Unknown,
    /// Running text.
    Text,
    /// Photograph or other continuous-tone image.
    Photo,
    /// Line drawing, diagram, or other line art.
    Drawing,
    /// Ruled line or frame border.
    Border,
}

impl ContentType {
    /// Every variant, in declaration order.
    pub const ALL: [ContentType; 5] = [
        ContentType::Unknown,
        ContentType::Text,
        ContentType::Photo,
        ContentType::Drawing,
        ContentType::Border,
    ];

    /// Tag of a region formed by merging a region of type `self` with one of
    /// type `other`. Identical tags survive; anything else degrades to `Unknown`.
    pub fn merge(self, other: ContentType) -> ContentType {
        if self == other {
            self
        } else {
            ContentType::Unknown
        }
    }

    /// Short lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Unknown => "unknown",
            ContentType::Text => "text",
            ContentType::Photo => "photo",
            ContentType::Drawing => "drawing",
            ContentType::Border => "border",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How a grayscale image is turned into a foreground/background bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum BinarizationMethod {
    /// Single global threshold chosen by Otsu's between-class variance.
    Otsu,
    /// Sauvola local threshold `mean * (1 + k * (std / 128 - 1))` over a
    /// `window` x `window` neighbourhood.
    Sauvola { window: u32, k: f64 },
    /// Niblack local threshold `mean + k * std` over a `window` x `window`
    /// neighbourhood. `k` is usually negative.
    Niblack { window: u32, k: f64 },
    /// Local mean threshold minus a constant `c` over a square of the given
    /// radius.
    LocalMean { radius: u32, c: i32 },
    /// Floyd-Steinberg error diffusion to two levels.
    Dither,
}

impl Default for BinarizationMethod {
    fn default() -> Self {
        BinarizationMethod::Sauvola {
            window: 31,
            k: 0.2,
        }
    }
}

/// Pixel adjacency used when labelling connected foreground components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Edge neighbours only.
    Four,
    /// Edge and corner neighbours.
    #[default]
    Eight,
}

/// Declared scan resolution. Passed through the engine unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub x_dpi: u32,
    pub y_dpi: u32,
}

impl Resolution {
    /// Same resolution on both axes.
    pub fn uniform(dpi: u32) -> Self {
        Self {
            x_dpi: dpi,
            y_dpi: dpi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_matching_tags() {
        for tag in ContentType::ALL {
            assert_eq!(tag.merge(tag), tag);
        }
    }

    #[test]
    fn merge_degrades_mismatched_tags() {
        assert_eq!(
            ContentType::Text.merge(ContentType::Photo),
            ContentType::Unknown
        );
        assert_eq!(
            ContentType::Border.merge(ContentType::Unknown),
            ContentType::Unknown
        );
    }

    #[test]
    fn binarization_method_serde_tagged() {
        let json = serde_json::to_string(&BinarizationMethod::Niblack { window: 15, k: -0.2 })
            .unwrap();
        assert!(json.contains("\"method\":\"niblack\""), "got {json}");
        let back: BinarizationMethod = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BinarizationMethod::Niblack { window: 15, k: -0.2 });
    }

    #[test]
    fn content_type_display() {
        assert_eq!(ContentType::Drawing.to_string(), "drawing");
    }
}
