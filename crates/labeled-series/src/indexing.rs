// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Label and position access.
//!
//! The bracket operator resolves a key in a fixed order:
//! 1. a single label is looked up as a label first; an int key that misses
//!    on a non-integer index falls back to a physical position,
//! 2. a slice whose bounds are ints (or open) slices positionally unless
//!    the index itself is integer-labeled; every other slice goes through
//!    the index slice locator with inclusive bounds,
//! 3. a list of bools is a mask, a list of ints is positions (again unless
//!    the index is integer-labeled), any other list reindexes.

use crate::fill::fill_positions;
use crate::series::Series;
use labeled_core::values::coerce_for_store;
use labeled_core::{Result, Scalar, SeriesError, Values, normalize_position};
use labeled_index::{IndexKind, Label, LabelIndex, Located};
use std::ops::Range;
use std::sync::Arc;

/// A subscript key.
#[derive(Clone, Debug, PartialEq)]
pub enum Key {
    Label(Label),
    Slice {
        start: Option<Label>,
        end: Option<Label>,
    },
    List(Vec<Label>),
    Mask(Vec<bool>),
}

impl Key {
    pub fn slice(start: Option<Label>, end: Option<Label>) -> Self {
        Self::Slice { start, end }
    }
}

impl From<Label> for Key {
    fn from(label: Label) -> Self {
        Self::Label(label)
    }
}

impl From<&str> for Key {
    fn from(label: &str) -> Self {
        Self::Label(Label::from(label))
    }
}

impl From<i64> for Key {
    fn from(label: i64) -> Self {
        Self::Label(Label::Int(label))
    }
}

impl From<i32> for Key {
    fn from(label: i32) -> Self {
        Self::Label(Label::from(label))
    }
}

impl From<Vec<Label>> for Key {
    fn from(labels: Vec<Label>) -> Self {
        Self::List(labels)
    }
}

impl From<Vec<bool>> for Key {
    fn from(mask: Vec<bool>) -> Self {
        Self::Mask(mask)
    }
}

/// Result of a lookup: one value, or an array when a key matches several
/// rows.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Scalar(Scalar),
    Series(Series),
}

impl Selection {
    pub fn into_scalar(self) -> Option<Scalar> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Series(_) => None,
        }
    }

    pub fn into_series(self) -> Option<Series> {
        match self {
            Self::Series(series) => Some(series),
            Self::Scalar(_) => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }
}

fn mask_positions(mask: &[bool], len: usize) -> Result<Vec<usize>> {
    if mask.len() != len {
        return Err(SeriesError::shape_mismatch(len, mask.len()));
    }
    Ok(mask
        .iter()
        .enumerate()
        .filter(|(_, keep)| **keep)
        .map(|(pos, _)| pos)
        .collect())
}

/// Clamps python-style slice bounds onto `0..len`.
fn clamp_bound(bound: isize, len: usize) -> usize {
    if bound < 0 {
        len.saturating_sub(bound.unsigned_abs())
    } else {
        bound.unsigned_abs().min(len)
    }
}

fn is_positional_bound(bound: Option<&Label>) -> bool {
    matches!(bound, None | Some(Label::Int(_)))
}

impl Series {
    fn positional_keys(&self) -> bool {
        self.index.kind() != IndexKind::Integer
    }

    fn scalar_at(&self, pos: usize) -> Scalar {
        self.values.get(pos).unwrap_or_default()
    }

    /// Rows matching a partial key on a hierarchical index, relabelled by
    /// the levels the key does not cover.
    fn partial_selection(&self, depth: usize, positions: &[usize]) -> Result<Series> {
        let labels = positions
            .iter()
            .filter_map(|&pos| self.index.get(pos))
            .map(|label| match label {
                Label::Tuple(parts) if parts.len() == depth + 1 => parts[depth].clone(),
                Label::Tuple(parts) => Label::Tuple(parts[depth..].to_vec()),
                flat => flat.clone(),
            })
            .collect();
        self.derive_with_index(self.values.take(positions)?, LabelIndex::new(labels))
    }

    /// Value at `label`, or the matching rows when the label repeats or is
    /// a partial key on a hierarchical index.
    pub fn get(&self, label: &Label) -> Result<Selection> {
        if let Some(found) = self.index.get_position(label) {
            return Ok(match found {
                Located::Single(pos) => Selection::Scalar(self.scalar_at(pos)),
                Located::Multiple(positions) => {
                    Selection::Series(self.take_positions(&positions)?)
                }
            });
        }
        if self.index.is_hierarchical() {
            if label.depth() < self.index.nlevels() {
                let positions = self.index.get_prefix_positions(label);
                if !positions.is_empty() {
                    return self
                        .partial_selection(label.depth(), &positions)
                        .map(Selection::Series);
                }
            }
        } else if matches!(label, Label::Tuple(_)) {
            return Err(SeriesError::ambiguous_join(format!(
                "tuple key {label} on an index without levels"
            )));
        }
        Err(SeriesError::key_not_found(label))
    }

    /// `get`, answering `default` instead of failing.
    pub fn get_or(&self, label: &Label, default: Scalar) -> Selection {
        self.get(label).unwrap_or(Selection::Scalar(default))
    }

    /// Value at a physical position; negative positions count from the end.
    pub fn iget(&self, position: isize) -> Result<Scalar> {
        let pos = normalize_position(position, self.len())?;
        Ok(self.scalar_at(pos))
    }

    /// Positional slice with python bounds: open, negative, or clamped.
    pub fn iget_slice(&self, start: Option<isize>, end: Option<isize>) -> Series {
        let len = self.len();
        let start = start.map_or(0, |s| clamp_bound(s, len));
        let end = end.map_or(len, |e| clamp_bound(e, len));
        self.slice_positions(start, end.max(start))
    }

    fn slice_range(&self, start: Option<&Label>, end: Option<&Label>) -> Result<Range<usize>> {
        // Int bounds on an integer index are labels, inclusive at both ends.
        // Positional slicing there goes through `iget_slice`.
        let positional = self.positional_keys()
            && !self.index.is_hierarchical()
            && is_positional_bound(start)
            && is_positional_bound(end);
        if positional {
            let len = self.len();
            let lo = start.and_then(Label::as_i64).map_or(0, |s| clamp_bound(s as isize, len));
            let hi = end.and_then(Label::as_i64).map_or(len, |e| clamp_bound(e as isize, len));
            return Ok(lo..hi.max(lo));
        }
        self.index.slice_locator(start, end)
    }

    fn list_positions(&self, labels: &[Label]) -> Option<Result<Vec<usize>>> {
        if !labels.is_empty() && labels.iter().all(|l| matches!(l, Label::Bool(_))) {
            let mask: Vec<bool> = labels.iter().map(|l| *l == Label::Bool(true)).collect();
            return Some(mask_positions(&mask, self.len()));
        }
        if self.positional_keys() && labels.iter().all(|l| matches!(l, Label::Int(_))) {
            return Some(
                labels
                    .iter()
                    .filter_map(Label::as_i64)
                    .map(|pos| normalize_position(pos as isize, self.len()))
                    .collect(),
            );
        }
        None
    }

    /// Bracket read; see the module docs for the resolution order.
    pub fn subscript(&self, key: &Key) -> Result<Selection> {
        match key {
            Key::Label(label) => match self.get(label) {
                Err(err) if err.is_missing_key() && self.positional_keys() => match label {
                    Label::Int(pos) => self.iget(*pos as isize).map(Selection::Scalar),
                    _ => Err(err),
                },
                other => other,
            },
            Key::Slice { start, end } => {
                let range = self.slice_range(start.as_ref(), end.as_ref())?;
                Ok(Selection::Series(self.slice_positions(range.start, range.end)))
            }
            Key::Mask(mask) => {
                let positions = mask_positions(mask, self.len())?;
                self.take_positions(&positions).map(Selection::Series)
            }
            Key::List(labels) => match self.list_positions(labels) {
                Some(positions) => self.take_positions(&positions?).map(Selection::Series),
                None => self.reindex_labels(labels).map(Selection::Series),
            },
        }
    }

    /// Every position a label addresses, with the same fallbacks as
    /// `subscript`; an absent label is `LabelNotFound`.
    fn label_positions(&self, label: &Label) -> Result<Vec<usize>> {
        if let Some(found) = self.index.get_position(label) {
            return Ok(found.positions());
        }
        if self.index.is_hierarchical() && label.depth() < self.index.nlevels() {
            let positions = self.index.get_prefix_positions(label);
            if !positions.is_empty() {
                return Ok(positions);
            }
        }
        match label {
            Label::Tuple(_) if !self.index.is_hierarchical() => Err(SeriesError::ambiguous_join(
                format!("tuple key {label} on an index without levels"),
            )),
            Label::Int(pos) if self.positional_keys() => {
                Ok(vec![normalize_position(*pos as isize, self.len())?])
            }
            _ => Err(SeriesError::label_not_found(label)),
        }
    }

    fn key_positions(&self, key: &Key) -> Result<Vec<usize>> {
        match key {
            Key::Label(label) => self.label_positions(label),
            Key::Slice { start, end } => Ok(self.slice_range(start.as_ref(), end.as_ref())?.collect()),
            Key::Mask(mask) => mask_positions(mask, self.len()),
            Key::List(labels) => match self.list_positions(labels) {
                Some(positions) => positions,
                None => labels.iter().try_fold(Vec::new(), |mut acc, label| {
                    let found = self
                        .index
                        .get_position(label)
                        .ok_or_else(|| SeriesError::label_not_found(label))?;
                    acc.extend(found.positions());
                    Ok(acc)
                }),
            },
        }
    }

    /// Bracket write of one value to every row the key addresses.
    ///
    /// Never changes the length; a label that is absent fails with
    /// `LabelNotFound`. Use [`Series::set_value`] to append.
    pub fn set(&mut self, key: &Key, value: &Scalar) -> Result<()> {
        let positions = self.key_positions(key)?;
        let values = vec![value.clone(); positions.len()];
        self.values.set_many(&positions, &values)
    }

    /// Bracket write of one value per addressed row.
    pub fn set_many(&mut self, key: &Key, values: &[Scalar]) -> Result<()> {
        let positions = self.key_positions(key)?;
        if positions.len() != values.len() {
            return Err(SeriesError::shape_mismatch(positions.len(), values.len()));
        }
        self.values.set_many(&positions, values)
    }

    /// Writes `value` at `label`, appending a new row when the label is
    /// absent. The index is cloned first if another array shares it.
    pub fn set_value(&mut self, label: Label, value: &Scalar) -> Result<()> {
        if let Some(found) = self.index.get_position(&label) {
            let positions = found.positions();
            let values = vec![value.clone(); positions.len()];
            return self.values.set_many(&positions, &values);
        }
        let kind = self.kind();
        let stored = coerce_for_store(kind, value)?;
        let tail = Values::from_scalars(vec![stored], Some(kind))?;
        let values = Values::concat(&[&self.values, &tail])?;
        Arc::make_mut(&mut self.index).push(label);
        self.values = values;
        Ok(())
    }

    /// Keeps values where `cond` holds and writes `other` elsewhere.
    pub fn where_mask(&self, cond: &[bool], other: &Scalar) -> Result<Series> {
        if cond.len() != self.len() {
            return Err(SeriesError::shape_mismatch(self.len(), cond.len()));
        }
        let replaced: Vec<usize> = (0..cond.len()).filter(|&pos| !cond[pos]).collect();
        self.derive(fill_positions(&self.values, &replaced, other)?)
    }

    /// Marks values where `cond` holds as missing.
    pub fn mask(&self, cond: &[bool]) -> Result<Series> {
        let inverted: Vec<bool> = cond.iter().map(|c| !c).collect();
        self.where_mask(&inverted, &Scalar::Missing)
    }

    /// Last non-missing value at or before `label` on a sorted index.
    pub fn asof(&self, label: &Label) -> Result<Scalar> {
        let Some(pos) = self.index.asof_position(label)? else {
            return Ok(Scalar::Missing);
        };
        Ok((0..=pos)
            .rev()
            .find(|&p| !self.values.is_missing_at(p))
            .map_or(Scalar::Missing, |p| self.scalar_at(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::{Key, Selection};
    use crate::series::Series;
    use labeled_core::{Kind, Scalar, SeriesError, Values};
    use labeled_index::{Label, LabelIndex};

    fn lettered(values: Vec<f64>) -> Series {
        let labels: LabelIndex = ["a", "b", "c", "d"]
            .iter()
            .take(values.len())
            .map(|s| Label::from(*s))
            .collect();
        Series::with_index(values, labels).expect("labeled")
    }

    fn int_labeled() -> Series {
        let labels: LabelIndex = [10i64, 20, 30].iter().map(|v| Label::from(*v)).collect();
        Series::with_index(vec![1.0, 2.0, 3.0], labels).expect("labeled")
    }

    fn scalar(selection: Selection) -> Scalar {
        selection.into_scalar().expect("scalar selection")
    }

    fn series(selection: Selection) -> Series {
        selection.into_series().expect("series selection")
    }

    #[test]
    fn get_returns_scalar_or_matching_rows() {
        let s = lettered(vec![1.0, 2.0, 3.0]);
        assert_eq!(scalar(s.get(&Label::from("b")).expect("b")), Scalar::Float(2.0));

        let dup = Series::with_index(
            vec![1i64, 2, 3],
            LabelIndex::from(vec![Label::from("x"), Label::from("y"), Label::from("x")]),
        )
        .expect("labeled");
        let rows = series(dup.get(&Label::from("x")).expect("x"));
        assert!(rows.values().equals(&Values::Int(vec![1, 3])));

        let err = s.get(&Label::from("z")).expect_err("absent");
        assert!(matches!(err, SeriesError::KeyNotFound(_)));
        assert_eq!(
            s.get_or(&Label::from("z"), Scalar::Int(0)),
            Selection::Scalar(Scalar::Int(0))
        );
    }

    #[test]
    fn tuple_key_on_flat_index_is_ambiguous() {
        let s = lettered(vec![1.0]);
        let err = s.get(&Label::from(("a", 1))).expect_err("flat index");
        assert!(matches!(err, SeriesError::AmbiguousJoin(_)));
    }

    #[test]
    fn partial_key_on_hierarchical_index_drops_leading_level() {
        let index = LabelIndex::from_levels(vec![
            vec![Label::from("a"), Label::from("a"), Label::from("b")],
            vec![Label::from(1), Label::from(2), Label::from(1)],
        ])
        .expect("levels");
        let s = Series::with_index(vec![1.0, 2.0, 3.0], index).expect("labeled");
        let rows = series(s.get(&Label::from("a")).expect("prefix"));
        assert_eq!(rows.labels(), &[Label::from(1), Label::from(2)]);
        assert_eq!(
            scalar(s.get(&Label::from(("b", 1))).expect("full key")),
            Scalar::Float(3.0)
        );
    }

    #[test]
    fn iget_accepts_negative_positions_and_rejects_out_of_range() {
        let s = lettered(vec![1.0, 2.0, 3.0]);
        assert_eq!(s.iget(-1).expect("last"), Scalar::Float(3.0));
        let err = s.iget(3).expect_err("past the end");
        assert_eq!(err, SeriesError::index_out_of_range(3, 3));
        assert!(s.iget(-4).is_err());
        assert_eq!(s.iget_slice(Some(-2), None).labels(), &[Label::from("b"), Label::from("c")]);
        assert!(s.iget_slice(Some(5), Some(9)).is_empty());
    }

    #[test]
    fn int_key_prefers_labels_on_integer_index() {
        let s = int_labeled();
        assert_eq!(scalar(s.subscript(&Key::from(20)).expect("label")), Scalar::Float(2.0));
        let err = s.subscript(&Key::from(1)).expect_err("no positional fallback");
        assert!(matches!(err, SeriesError::KeyNotFound(_)));

        let text = lettered(vec![1.0, 2.0, 3.0]);
        assert_eq!(scalar(text.subscript(&Key::from(1)).expect("position")), Scalar::Float(2.0));
    }

    #[test]
    fn slices_are_positional_only_off_integer_indexes() {
        let text = lettered(vec![1.0, 2.0, 3.0, 4.0]);
        let positional = series(
            text.subscript(&Key::slice(Some(Label::from(1)), Some(Label::from(3))))
                .expect("slice"),
        );
        assert_eq!(positional.labels(), &[Label::from("b"), Label::from("c")]);

        let by_label = series(
            text.subscript(&Key::slice(Some(Label::from("b")), Some(Label::from("d"))))
                .expect("slice"),
        );
        assert_eq!(by_label.len(), 3);

        let ints = int_labeled();
        let inclusive = series(
            ints.subscript(&Key::slice(Some(Label::from(15)), Some(Label::from(30))))
                .expect("label slice"),
        );
        assert_eq!(inclusive.labels(), &[Label::from(20), Label::from(30)]);
        let by_position = ints.iget_slice(Some(0), Some(2));
        assert_eq!(by_position.labels(), &[Label::from(10), Label::from(20)]);
    }

    #[test]
    fn lists_dispatch_on_element_kind() {
        let text = lettered(vec![1.0, 2.0, 3.0]);
        let by_position = series(
            text.subscript(&Key::List(vec![Label::from(2), Label::from(0)]))
                .expect("positions"),
        );
        assert_eq!(by_position.labels(), &[Label::from("c"), Label::from("a")]);

        let masked = series(
            text.subscript(&Key::List(vec![
                Label::from(true),
                Label::from(false),
                Label::from(true),
            ]))
            .expect("bool list"),
        );
        assert_eq!(masked.len(), 2);

        let reindexed = series(
            text.subscript(&Key::List(vec![Label::from("c"), Label::from("z")]))
                .expect("reindex"),
        );
        assert_eq!(reindexed.labels(), &[Label::from("c"), Label::from("z")]);
        assert!(reindexed.values().is_missing_at(1));

        let ints = int_labeled();
        let labels = series(
            ints.subscript(&Key::List(vec![Label::from(30), Label::from(10)]))
                .expect("labels"),
        );
        assert_eq!(labels.to_f64().expect("numeric"), vec![3.0, 1.0]);

        let err = text.subscript(&Key::Mask(vec![true])).expect_err("short mask");
        assert!(matches!(err, SeriesError::ShapeMismatch { .. }));
    }

    #[test]
    fn set_never_appends_and_leaves_array_intact_on_error() {
        let mut s = lettered(vec![1.0, 2.0, 3.0]);
        s.set(&Key::from("b"), &Scalar::Float(9.0)).expect("set");
        assert_eq!(s.iget(1).expect("b"), Scalar::Float(9.0));

        let err = s.set(&Key::from("z"), &Scalar::Float(0.0)).expect_err("absent");
        assert!(matches!(err, SeriesError::LabelNotFound(_)));
        assert_eq!(s.len(), 3);

        let err = s
            .set_many(&Key::Mask(vec![true, true, false]), &[Scalar::Float(0.0)])
            .expect_err("shape");
        assert!(matches!(err, SeriesError::ShapeMismatch { .. }));

        let err = s
            .set(&Key::List(vec![Label::from("a"), Label::from("zz")]), &Scalar::Float(7.0))
            .expect_err("partial label list");
        assert!(matches!(err, SeriesError::LabelNotFound(_)));
        assert_eq!(s.iget(0).expect("a"), Scalar::Float(1.0));
    }

    #[test]
    fn set_value_appends_and_copies_shared_index() {
        let mut s = lettered(vec![1.0, 2.0]);
        let view = s.clone();
        assert!(s.shares_index_with(&view));
        s.set_value(Label::from("c"), &Scalar::Float(3.0)).expect("append");
        assert_eq!(s.len(), 3);
        assert_eq!(view.len(), 2);
        assert!(!s.shares_index_with(&view));

        s.set_value(Label::from("a"), &Scalar::Float(5.0)).expect("overwrite");
        assert_eq!(s.iget(0).expect("a"), Scalar::Float(5.0));

        let err = s
            .set_value(Label::from("d"), &Scalar::from("text"))
            .expect_err("kind mismatch");
        assert!(matches!(err, SeriesError::InvalidInput(_)));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn where_and_mask_upcast_int_arrays() {
        let s = Series::new(vec![1i64, 2, 3]);
        let kept = s.where_mask(&[true, false, true], &Scalar::Int(0)).expect("where");
        assert!(kept.values().equals(&Values::Int(vec![1, 0, 3])));
        let masked = s.mask(&[false, true, false]).expect("mask");
        assert_eq!(masked.kind(), Kind::Float);
        assert!(masked.values().is_missing_at(1));
    }

    #[test]
    fn asof_skips_missing_values() {
        let s = int_labeled();
        let mut with_gap = s.clone();
        with_gap
            .set(&Key::from(20), &Scalar::Float(f64::NAN))
            .expect("set");
        assert_eq!(with_gap.asof(&Label::from(25)).expect("asof"), Scalar::Float(1.0));
        assert_eq!(s.asof(&Label::from(5)).expect("before start"), Scalar::Missing);
        assert_eq!(s.asof(&Label::from(99)).expect("past end"), Scalar::Float(3.0));
    }
}
