// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Segwerk.

use thiserror::Error;

/// Top-level error type for all Segwerk operations.
///
/// Only malformed input and I/O surface here. An unreliable skew estimate is
/// an ordinary value, and broken geometry invariants are assertions.
#[derive(Debug, Error)]
pub enum SegwerkError {
    // -- Input errors --
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Codec / storage --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SegwerkError>;
