// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: page decoding, deskew rotation, cropping, and PNG output.

pub mod processor;

pub use processor::{PageImage, crop, deskew, save, to_png_bytes};
