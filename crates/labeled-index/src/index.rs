// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::label::Label;
use labeled_core::{FillMethod, Result, SeriesError};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::Range;

/// Kind of an index, inferred from its labels at construction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Empty,
    Integer,
    Boolean,
    Datetime,
    Text,
    Mixed,
    Hierarchical { levels: usize },
}

impl IndexKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Datetime => "datetime",
            Self::Text => "text",
            Self::Mixed => "mixed",
            Self::Hierarchical { .. } => "hierarchical",
        }
    }

    pub fn of_label(label: &Label) -> Self {
        match label {
            Label::Bool(_) => Self::Boolean,
            Label::Int(_) => Self::Integer,
            Label::Datetime(_) => Self::Datetime,
            Label::Str(_) => Self::Text,
            Label::Tuple(parts) => Self::Hierarchical {
                levels: parts.len(),
            },
        }
    }

    /// Kind of an index holding labels of both kinds.
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Empty, k) | (k, Self::Empty) => k,
            (a, b) if a == b => a,
            _ => Self::Mixed,
        }
    }

    pub fn infer(labels: &[Label]) -> Self {
        labels
            .iter()
            .fold(Self::Empty, |kind, label| kind.combine(Self::of_label(label)))
    }
}

/// Result of a single-label lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Located {
    Single(usize),
    Multiple(Vec<usize>),
}

impl Located {
    pub fn positions(&self) -> Vec<usize> {
        match self {
            Self::Single(pos) => vec![*pos],
            Self::Multiple(positions) => positions.clone(),
        }
    }

    pub fn first(&self) -> usize {
        match self {
            Self::Single(pos) => *pos,
            Self::Multiple(positions) => positions.first().copied().unwrap_or_default(),
        }
    }
}

/// Ordered, immutable-once-built sequence of labels with hashed lookup.
///
/// Uniqueness, monotonicity and kind are computed once at construction.
/// Series share indexes through `Arc<LabelIndex>`; the only in-place
/// mutation, [`LabelIndex::push`], goes through `Arc::make_mut`.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "Vec<Label>", into = "Vec<Label>")
)]
#[derive(Clone, Debug)]
pub struct LabelIndex {
    labels: Vec<Label>,
    lookup: HashMap<Label, Vec<usize>>,
    kind: IndexKind,
    is_unique: bool,
    monotonic_increasing: bool,
    monotonic_decreasing: bool,
}

impl LabelIndex {
    pub fn new(labels: Vec<Label>) -> Self {
        let mut lookup: HashMap<Label, Vec<usize>> = HashMap::with_capacity(labels.len());
        for (pos, label) in labels.iter().enumerate() {
            lookup.entry(label.clone()).or_default().push(pos);
        }
        let is_unique = lookup.len() == labels.len();
        let monotonic_increasing = labels.windows(2).all(|w| w[0] <= w[1]);
        let monotonic_decreasing = labels.windows(2).all(|w| w[0] >= w[1]);
        let kind = IndexKind::infer(&labels);
        Self {
            labels,
            lookup,
            kind,
            is_unique,
            monotonic_increasing,
            monotonic_decreasing,
        }
    }

    /// Default integer labels `0..len`.
    pub fn range(len: usize) -> Self {
        Self::new((0..len).map(Label::from).collect())
    }

    /// Zips per-level label vectors into a hierarchical index.
    pub fn from_levels(levels: Vec<Vec<Label>>) -> Result<Self> {
        let Some(len) = levels.first().map(Vec::len) else {
            return Err(SeriesError::invalid_index(
                "hierarchical index needs at least one level",
            ));
        };
        if let Some(bad) = levels.iter().find(|level| level.len() != len) {
            return Err(SeriesError::shape_mismatch(len, bad.len()));
        }
        let labels = (0..len)
            .map(|pos| Label::Tuple(levels.iter().map(|level| level[pos].clone()).collect()))
            .collect();
        Ok(Self::new(labels))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn get(&self, pos: usize) -> Option<&Label> {
        self.labels.get(pos)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.labels.iter()
    }

    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    pub fn is_unique(&self) -> bool {
        self.is_unique
    }

    /// Non-decreasing label order.
    pub fn is_monotonic(&self) -> bool {
        self.monotonic_increasing
    }

    pub fn is_monotonic_decreasing(&self) -> bool {
        self.monotonic_decreasing
    }

    pub fn is_hierarchical(&self) -> bool {
        matches!(self.kind, IndexKind::Hierarchical { .. })
    }

    pub fn nlevels(&self) -> usize {
        match self.kind {
            IndexKind::Hierarchical { levels } => levels,
            _ => 1,
        }
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.lookup.contains_key(label)
    }

    pub fn get_position(&self, label: &Label) -> Option<Located> {
        let positions = self.lookup.get(label)?;
        Some(match positions.as_slice() {
            [single] => Located::Single(*single),
            many => Located::Multiple(many.to_vec()),
        })
    }

    /// First position of every label, or `None` when absent.
    pub fn get_positions(&self, labels: &[Label]) -> Vec<Option<usize>> {
        labels
            .iter()
            .map(|label| self.lookup.get(label).and_then(|p| p.first().copied()))
            .collect()
    }

    /// Exact-match position map for reindexing; requires a unique index.
    pub fn get_indexer(&self, target: &[Label]) -> Result<Vec<Option<usize>>> {
        if !self.is_unique {
            return Err(SeriesError::invalid_index(
                "cannot reindex from an index with duplicate labels",
            ));
        }
        Ok(self.get_positions(target))
    }

    fn bound_parts(bound: &Label) -> &[Label] {
        match bound {
            Label::Tuple(parts) => parts,
            flat => std::slice::from_ref(flat),
        }
    }

    /// Compares the leading components of `label` against a (possibly
    /// partial) bound.
    fn prefix_cmp(label: &Label, bound: &Label) -> Ordering {
        for (level, part) in Self::bound_parts(bound).iter().enumerate() {
            let ord = match label.component(level) {
                Some(component) => component.cmp(part),
                None => Ordering::Less,
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Positions whose leading components equal `prefix`.
    pub fn get_prefix_positions(&self, prefix: &Label) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| Self::prefix_cmp(label, prefix) == Ordering::Equal)
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Positions whose component at `level` equals `key`.
    pub fn get_loc_level(&self, level: usize, key: &Label) -> Result<Vec<usize>> {
        self.check_level(level)?;
        Ok(self
            .labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.component(level) == Some(key))
            .map(|(pos, _)| pos)
            .collect())
    }

    /// Position range covering the labels from `start` to `end`, both
    /// inclusive. Either bound may be open.
    ///
    /// Monotonic indexes use binary search and accept bounds that are not
    /// present (and partial tuple bounds on hierarchical indexes). Other
    /// indexes require both bounds to be present exactly once.
    pub fn slice_locator(&self, start: Option<&Label>, end: Option<&Label>) -> Result<Range<usize>> {
        if self.monotonic_increasing {
            let lo = start.map_or(0, |s| {
                self.labels
                    .partition_point(|l| Self::prefix_cmp(l, s) == Ordering::Less)
            });
            let hi = end.map_or(self.len(), |e| {
                self.labels
                    .partition_point(|l| Self::prefix_cmp(l, e) != Ordering::Greater)
            });
            return Ok(lo..hi.max(lo));
        }
        let unique_position = |label: &Label| -> Result<usize> {
            match self.get_position(label) {
                Some(Located::Single(pos)) => Ok(pos),
                Some(Located::Multiple(_)) => Err(SeriesError::invalid_index(format!(
                    "cannot slice by duplicated label {label} on a non-monotonic index"
                ))),
                None => Err(SeriesError::key_not_found(label)),
            }
        };
        let lo = start.map(&unique_position).transpose()?.unwrap_or(0);
        let hi = end
            .map(&unique_position)
            .transpose()?
            .map_or(self.len(), |pos| pos + 1);
        Ok(lo..hi.max(lo))
    }

    fn check_level(&self, level: usize) -> Result<()> {
        if level >= self.nlevels() {
            return Err(SeriesError::invalid_index(format!(
                "level {level} out of range for index with {} level(s)",
                self.nlevels()
            )));
        }
        Ok(())
    }

    /// Components at `level` for every position.
    pub fn level_values(&self, level: usize) -> Result<Vec<Label>> {
        self.check_level(level)?;
        self.labels
            .iter()
            .map(|label| {
                label.component(level).cloned().ok_or_else(|| {
                    SeriesError::invalid_index(format!("label {label} has no level {level}"))
                })
            })
            .collect()
    }

    /// New index with `label` inserted before `position`.
    pub fn insert(&self, position: usize, label: Label) -> Result<Self> {
        if position > self.len() {
            return Err(SeriesError::index_out_of_range(position as isize, self.len()));
        }
        let mut labels = self.labels.clone();
        labels.insert(position, label);
        Ok(Self::new(labels))
    }

    /// Appends one label in place, updating the cached properties.
    pub fn push(&mut self, label: Label) -> usize {
        let pos = self.labels.len();
        if let Some(last) = self.labels.last() {
            self.monotonic_increasing &= *last <= label;
            self.monotonic_decreasing &= *last >= label;
        }
        self.kind = self.kind.combine(IndexKind::of_label(&label));
        let positions = self.lookup.entry(label.clone()).or_default();
        positions.push(pos);
        self.is_unique &= positions.len() == 1;
        self.labels.push(label);
        pos
    }

    pub fn take(&self, positions: &[usize]) -> Result<Self> {
        let labels = positions
            .iter()
            .map(|&pos| {
                self.labels
                    .get(pos)
                    .cloned()
                    .ok_or_else(|| SeriesError::index_out_of_range(pos as isize, self.len()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(labels))
    }

    /// Half-open positional slice, clamped to the index.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.len());
        let start = start.min(end);
        Self::new(self.labels[start..end].to_vec())
    }

    pub fn append(&self, other: &LabelIndex) -> Self {
        let mut labels = self.labels.clone();
        labels.extend(other.labels.iter().cloned());
        Self::new(labels)
    }

    pub fn rename(&self, mut mapper: impl FnMut(&Label) -> Label) -> Self {
        Self::new(self.labels.iter().map(&mut mapper).collect())
    }

    /// In-place [`LabelIndex::rename`]; cached properties are rebuilt.
    pub fn relabel(&mut self, mapper: impl FnMut(&Label) -> Label) {
        *self = self.rename(mapper);
    }

    /// Stable lexicographic ordering across levels.
    ///
    /// `ascending` holds one direction per level, or a single direction
    /// applied to every level.
    pub fn lexsort_indexer(&self, ascending: &[bool]) -> Result<Vec<usize>> {
        let levels = self.nlevels();
        let directions: Vec<bool> = match ascending {
            [single] => vec![*single; levels],
            many if many.len() == levels => many.to_vec(),
            many => {
                return Err(SeriesError::invalid_input(format!(
                    "expected 1 or {levels} sort direction(s), got {}",
                    many.len()
                )));
            }
        };
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| {
            for (level, &asc) in directions.iter().enumerate() {
                let ord = self.labels[a]
                    .component(level)
                    .cmp(&self.labels[b].component(level));
                if ord != Ordering::Equal {
                    return if asc { ord } else { ord.reverse() };
                }
            }
            Ordering::Equal
        });
        Ok(order)
    }

    /// Stable ordering by one level first, then the remaining levels
    /// ascending.
    pub fn level_sort_indexer(&self, level: usize, ascending: bool) -> Result<Vec<usize>> {
        self.check_level(level)?;
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| {
            let (la, lb) = (&self.labels[a], &self.labels[b]);
            let primary = la.component(level).cmp(&lb.component(level));
            let primary = if ascending { primary } else { primary.reverse() };
            primary.then_with(|| {
                (0..self.nlevels())
                    .filter(|&other| other != level)
                    .map(|other| la.component(other).cmp(&lb.component(other)))
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            })
        });
        Ok(order)
    }

    /// Rearranges the levels of a hierarchical index.
    pub fn reorder_levels(&self, order: &[usize]) -> Result<Self> {
        if !self.is_hierarchical() {
            return Err(SeriesError::invalid_index(
                "reordering levels requires a hierarchical index",
            ));
        }
        let levels = self.nlevels();
        let mut seen = vec![false; levels];
        for &level in order {
            if level >= levels || std::mem::replace(&mut seen[level], true) {
                return Err(SeriesError::invalid_input(format!(
                    "level order {order:?} is not a permutation of 0..{levels}"
                )));
            }
        }
        if order.len() != levels {
            return Err(SeriesError::shape_mismatch(levels, order.len()));
        }
        Ok(self.rename(|label| match label {
            Label::Tuple(parts) => Label::Tuple(order.iter().map(|&i| parts[i].clone()).collect()),
            flat => flat.clone(),
        }))
    }

    pub fn swap_level(&self, i: usize, j: usize) -> Result<Self> {
        let mut order: Vec<usize> = (0..self.nlevels()).collect();
        if i >= order.len() || j >= order.len() {
            return Err(SeriesError::invalid_index(format!(
                "cannot swap levels {i} and {j} of an index with {} level(s)",
                order.len()
            )));
        }
        order.swap(i, j);
        self.reorder_levels(&order)
    }

    /// Source position for every target label, optionally filling
    /// non-matches from neighbouring labels.
    ///
    /// A fill method needs a unique, monotonic source index. `Pad` takes
    /// the last source label `<=` the target and `Backfill` the first `>=`;
    /// `limit` caps how many inexact targets one source position may feed.
    pub fn reindex_indexer(
        &self,
        target: &[Label],
        method: Option<FillMethod>,
        limit: Option<usize>,
    ) -> Result<Vec<Option<usize>>> {
        let exact = self.get_indexer(target)?;
        let Some(method) = method else {
            return Ok(exact);
        };
        if !self.monotonic_increasing {
            return Err(SeriesError::invalid_index(format!(
                "{} reindexing requires a monotonic increasing index",
                method.as_str()
            )));
        }
        let mut fed: HashMap<usize, usize> = HashMap::new();
        Ok(target
            .iter()
            .zip(exact)
            .map(|(label, exact)| {
                if exact.is_some() {
                    return exact;
                }
                let source = match method {
                    FillMethod::Pad => self.labels.partition_point(|l| l <= label).checked_sub(1),
                    FillMethod::Backfill => {
                        let pos = self.labels.partition_point(|l| l < label);
                        (pos < self.len()).then_some(pos)
                    }
                }?;
                let count = fed.entry(source).or_default();
                if limit.is_some_and(|limit| *count >= limit) {
                    return None;
                }
                *count += 1;
                Some(source)
            })
            .collect())
    }

    /// Last position whose label is `<= label`; requires a monotonic index.
    pub fn asof_position(&self, label: &Label) -> Result<Option<usize>> {
        if !self.monotonic_increasing {
            return Err(SeriesError::invalid_index(
                "asof lookup requires a monotonic increasing index",
            ));
        }
        Ok(self.labels.partition_point(|l| l <= label).checked_sub(1))
    }

    pub fn equals(&self, other: &LabelIndex) -> bool {
        self.labels == other.labels
    }
}

impl PartialEq for LabelIndex {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<Vec<Label>> for LabelIndex {
    fn from(labels: Vec<Label>) -> Self {
        Self::new(labels)
    }
}

impl From<LabelIndex> for Vec<Label> {
    fn from(index: LabelIndex) -> Self {
        index.labels
    }
}

impl FromIterator<Label> for LabelIndex {
    fn from_iter<T: IntoIterator<Item = Label>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
