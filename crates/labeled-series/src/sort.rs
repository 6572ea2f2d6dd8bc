// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::series::Series;
use labeled_core::kernels::rank;
use labeled_core::{RankTies, Result, Scalar, Values};
use std::cmp::Ordering;
use std::sync::Arc;

/// Sorting algorithm for value sorts.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKind {
    /// Ties keep their original relative order.
    #[default]
    Stable,
    Unstable,
}

/// Options for value sorts.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderOptions {
    pub ascending: bool,
    /// Missing values go last when true, first otherwise.
    pub na_last: bool,
    pub kind: SortKind,
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self {
            ascending: true,
            na_last: true,
            kind: SortKind::Stable,
        }
    }
}

/// Options for [`Series::rank`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankOptions {
    pub ties: RankTies,
    pub ascending: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            ties: RankTies::Average,
            ascending: true,
        }
    }
}

/// Orders every pair of non-missing scalars: comparable values by value,
/// otherwise by variant (bool, number, datetime, text).
fn total_order(a: &Scalar, b: &Scalar) -> Ordering {
    fn rank(value: &Scalar) -> u8 {
        match value {
            Scalar::Bool(_) => 0,
            Scalar::Int(_) | Scalar::Float(_) => 1,
            Scalar::Datetime(_) => 2,
            Scalar::Str(_) => 3,
            Scalar::Missing => 4,
        }
    }
    a.compare(b).unwrap_or_else(|| rank(a).cmp(&rank(b)))
}

/// Non-missing positions in sorted order.
fn sorted_valid_positions(values: &Values, options: &OrderOptions) -> Vec<usize> {
    let scalars = values.to_scalars();
    let mut valid: Vec<usize> = (0..scalars.len())
        .filter(|&pos| !scalars[pos].is_missing())
        .collect();
    let compare = |a: &usize, b: &usize| {
        let ord = total_order(&scalars[*a], &scalars[*b]);
        if options.ascending { ord } else { ord.reverse() }
    };
    match options.kind {
        SortKind::Stable => valid.sort_by(compare),
        SortKind::Unstable => valid.sort_unstable_by(compare),
    }
    valid
}

impl Series {
    fn order_positions(&self, options: &OrderOptions) -> Vec<usize> {
        let valid = sorted_valid_positions(&self.values, options);
        let missing = (0..self.len()).filter(|&pos| self.values.is_missing_at(pos));
        if options.na_last {
            valid.into_iter().chain(missing).collect()
        } else {
            missing.chain(valid).collect()
        }
    }

    /// Sorts by value; labels move with their values.
    pub fn order(&self, options: &OrderOptions) -> Result<Series> {
        self.take_positions(&self.order_positions(options))
    }

    /// In-place [`Series::order`]. A shared index is cloned before it is
    /// permuted, so arrays sharing it are unaffected.
    pub fn sort_inplace(&mut self, options: &OrderOptions) -> Result<()> {
        let order = self.order_positions(options);
        let values = self.values.take(&order)?;
        let permuted = self.index.take(&order)?;
        *Arc::make_mut(&mut self.index) = permuted;
        self.values = values;
        Ok(())
    }

    /// Indices that sort the non-missing values, counted among the
    /// non-missing values and written back into their slots; missing slots
    /// hold `-1`.
    pub fn argsort(&self, options: &OrderOptions) -> Result<Series> {
        let valid: Vec<usize> = (0..self.len())
            .filter(|&pos| !self.values.is_missing_at(pos))
            .collect();
        let compressed = self.values.take(&valid)?;
        let order = sorted_valid_positions(&compressed, options);
        let mut out = vec![-1i64; self.len()];
        for (&slot, &sorted) in valid.iter().zip(&order) {
            out[slot] = sorted as i64;
        }
        self.derive(Values::Int(out))
    }

    /// Lexicographic sort by label; one direction per level, or one for
    /// all levels.
    pub fn sort_by_label(&self, ascending: &[bool]) -> Result<Series> {
        let order = self.index.lexsort_indexer(ascending)?;
        self.take_positions(&order)
    }

    pub fn sort_index(&self, ascending: bool) -> Result<Series> {
        self.sort_by_label(&[ascending])
    }

    /// Sorts by one level first, then by the remaining levels.
    pub fn sort_level(&self, level: usize, ascending: bool) -> Result<Series> {
        let order = self.index.level_sort_indexer(level, ascending)?;
        self.take_positions(&order)
    }

    pub fn swap_level(&self, i: usize, j: usize) -> Result<Series> {
        self.derive_with_index(self.values.clone(), self.index.swap_level(i, j)?)
    }

    pub fn reorder_levels(&self, order: &[usize]) -> Result<Series> {
        self.derive_with_index(self.values.clone(), self.index.reorder_levels(order)?)
    }

    /// One-based ranks as floats; missing values keep a missing rank.
    pub fn rank(&self, options: &RankOptions) -> Result<Series> {
        let ranks = rank(&self.to_f64()?, options.ties, options.ascending);
        self.derive(Values::Float(ranks))
    }
}
