// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry kernel: axis-aligned boxes and oriented rectangles.

pub mod bbox;
pub mod rotated;

pub use bbox::{BoundingBox, Tolerance};
pub use rotated::{RotatedRect, convex_hull, normalize_half_turn, normalize_quarter_turn};
