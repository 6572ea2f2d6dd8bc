// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Position indexers for method fills over a missing mask.
//!
//! An indexer maps every output slot to the source slot whose value it
//! takes. Slots that stay missing map to themselves, so gathering a buffer
//! through an indexer never invents values.

use crate::error::{Result, SeriesError};

/// Direction of a method fill.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FillMethod {
    /// Propagate the last valid value forward.
    Pad,
    /// Propagate the next valid value backward.
    Backfill,
}

impl FillMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pad => "pad",
            Self::Backfill => "backfill",
        }
    }

    /// Parses the method names accepted by fills and reindexing.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pad" | "ffill" => Ok(Self::Pad),
            "backfill" | "bfill" => Ok(Self::Backfill),
            other => Err(SeriesError::invalid_input(format!(
                "unknown fill method '{other}'; expected one of pad, ffill, backfill, bfill"
            ))),
        }
    }

    pub fn indexer(self, missing: &[bool], limit: Option<usize>) -> Vec<usize> {
        match self {
            Self::Pad => pad_indexer(missing, limit),
            Self::Backfill => backfill_indexer(missing, limit),
        }
    }
}

/// Rejects a zero `limit`.
pub fn validate_limit(limit: Option<usize>) -> Result<()> {
    if limit == Some(0) {
        return Err(SeriesError::invalid_input(
            "limit must be >= 1 when provided",
        ));
    }
    Ok(())
}

/// Forward-fill indexer.
///
/// Each missing slot takes the nearest valid slot before it, unless that
/// would make the current run of fills longer than `limit`. Leading missing
/// slots have no source and stay missing.
pub fn pad_indexer(missing: &[bool], limit: Option<usize>) -> Vec<usize> {
    let mut indexer: Vec<usize> = (0..missing.len()).collect();
    let mut last_valid: Option<usize> = None;
    let mut run = 0usize;
    for (pos, &is_missing) in missing.iter().enumerate() {
        if !is_missing {
            last_valid = Some(pos);
            run = 0;
            continue;
        }
        run += 1;
        if let Some(source) = last_valid
            && limit.is_none_or(|limit| run <= limit)
        {
            indexer[pos] = source;
        }
    }
    indexer
}

/// Backward-fill indexer; the mirror of [`pad_indexer`].
pub fn backfill_indexer(missing: &[bool], limit: Option<usize>) -> Vec<usize> {
    let mut indexer: Vec<usize> = (0..missing.len()).collect();
    let mut next_valid: Option<usize> = None;
    let mut run = 0usize;
    for (pos, &is_missing) in missing.iter().enumerate().rev() {
        if !is_missing {
            next_valid = Some(pos);
            run = 0;
            continue;
        }
        run += 1;
        if let Some(source) = next_valid
            && limit.is_none_or(|limit| run <= limit)
        {
            indexer[pos] = source;
        }
    }
    indexer
}
