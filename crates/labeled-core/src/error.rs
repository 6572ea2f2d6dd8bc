// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::fmt::Display;

/// Structured error type for labeled-array APIs.
///
/// # Error Philosophy
/// - Messages name the offending label, position or shape.
/// - Variants are structured for reliable pattern matching.
/// - Expected failures are represented as `SeriesError` (not panics).
/// - A failed construction never yields a partial object, and a failed
///   in-place mutation leaves the target untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("key not found: {0}")]
    KeyNotFound(String),
    #[error("label not found: {0}")]
    LabelNotFound(String),
    #[error("index out of range: position {index} for length {len}")]
    IndexOutOfRange { index: isize, len: usize },
    #[error("invalid index: {0}")]
    InvalidIndex(String),
    #[error("unrepresentable missing value: {0}")]
    UnrepresentableMissing(String),
    #[error("shape mismatch: expected length {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("ambiguous join: {0}")]
    AmbiguousJoin(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl SeriesError {
    /// Creates a `SeriesError::KeyNotFound` for the given key.
    pub fn key_not_found(key: impl Display) -> Self {
        Self::KeyNotFound(key.to_string())
    }

    /// Creates a `SeriesError::LabelNotFound` for the given label.
    pub fn label_not_found(label: impl Display) -> Self {
        Self::LabelNotFound(label.to_string())
    }

    /// Creates a `SeriesError::IndexOutOfRange`.
    pub fn index_out_of_range(index: isize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Creates a `SeriesError::InvalidIndex`.
    pub fn invalid_index(msg: impl Into<String>) -> Self {
        Self::InvalidIndex(msg.into())
    }

    /// Creates a `SeriesError::UnrepresentableMissing`.
    pub fn unrepresentable_missing(msg: impl Into<String>) -> Self {
        Self::UnrepresentableMissing(msg.into())
    }

    /// Creates a `SeriesError::ShapeMismatch`.
    pub fn shape_mismatch(expected: usize, got: usize) -> Self {
        Self::ShapeMismatch { expected, got }
    }

    /// Creates a `SeriesError::AmbiguousJoin`.
    pub fn ambiguous_join(msg: impl Into<String>) -> Self {
        Self::AmbiguousJoin(msg.into())
    }

    /// Creates a `SeriesError::InvalidInput`.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a `SeriesError::NotSupported`.
    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    /// True for the two "absent label" variants.
    pub fn is_missing_key(&self) -> bool {
        matches!(self, Self::KeyNotFound(_) | Self::LabelNotFound(_))
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SeriesError>;

/// Resolves a possibly negative position against `len`.
///
/// Valid positions lie in `[-len, len)`.
pub fn normalize_position(position: isize, len: usize) -> Result<usize> {
    let signed_len = isize::try_from(len)
        .map_err(|_| SeriesError::invalid_input(format!("length {len} exceeds isize")))?;
    let resolved = if position < 0 {
        position + signed_len
    } else {
        position
    };
    if resolved < 0 || resolved >= signed_len {
        return Err(SeriesError::index_out_of_range(position, len));
    }
    Ok(resolved as usize)
}
