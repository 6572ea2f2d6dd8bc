// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use labeled_core::{Kind, Result, Scalar, SeriesError, Values, normalize_position};
use labeled_index::{Label, LabelIndex};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One-dimensional labeled array.
///
/// Pairs a homogeneously-kinded value buffer with an ordered label index of
/// the same length. The index is shared by reference between derived arrays
/// and cloned on write; the value buffer is always owned.
///
/// Equality compares labels and values; the name is provenance only.
#[derive(Clone, Debug)]
pub struct Series {
    pub(crate) values: Values,
    pub(crate) index: Arc<LabelIndex>,
    pub(crate) name: Option<String>,
}

/// Name carried by a binary result: kept only when both inputs agree.
pub(crate) fn joined_name(left: &Option<String>, right: &Option<String>) -> Option<String> {
    if left == right { left.clone() } else { None }
}

impl Series {
    /// Builds an array with default integer labels `0..len`.
    pub fn new(values: impl Into<Values>) -> Self {
        let values = values.into();
        let index = Arc::new(LabelIndex::range(values.len()));
        Self {
            values,
            index,
            name: None,
        }
    }

    pub fn with_index(values: impl Into<Values>, index: impl Into<LabelIndex>) -> Result<Self> {
        Self::from_parts(values.into(), Arc::new(index.into()), None)
    }

    /// Pairs a buffer with a (possibly shared) index.
    pub fn from_parts(values: Values, index: Arc<LabelIndex>, name: Option<String>) -> Result<Self> {
        if values.len() != index.len() {
            return Err(SeriesError::shape_mismatch(index.len(), values.len()));
        }
        Ok(Self {
            values,
            index,
            name,
        })
    }

    /// Builds from scalars, inferring the kind unless one is given.
    pub fn from_scalars(
        values: Vec<Scalar>,
        index: Option<LabelIndex>,
        kind: Option<Kind>,
    ) -> Result<Self> {
        let index = index.unwrap_or_else(|| LabelIndex::range(values.len()));
        if index.len() != values.len() {
            return Err(SeriesError::shape_mismatch(index.len(), values.len()));
        }
        Self::from_parts(Values::from_scalars(values, kind)?, Arc::new(index), None)
    }

    /// Builds from a mapping; labels come out sorted.
    pub fn from_map(map: BTreeMap<Label, Scalar>, kind: Option<Kind>) -> Result<Self> {
        let (labels, values): (Vec<Label>, Vec<Scalar>) = map.into_iter().unzip();
        Self::from_scalars(values, Some(LabelIndex::new(labels)), kind)
    }

    /// Builds from label/value pairs, keeping their order.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (Label, Scalar)>,
        kind: Option<Kind>,
    ) -> Result<Self> {
        let (labels, values): (Vec<Label>, Vec<Scalar>) = pairs.into_iter().unzip();
        Self::from_scalars(values, Some(LabelIndex::new(labels)), kind)
    }

    /// Broadcasts one scalar over every label of `index`.
    pub fn from_scalar(value: &Scalar, index: LabelIndex, kind: Option<Kind>) -> Result<Self> {
        let values = Values::full(value, index.len(), kind)?;
        Self::from_parts(values, Arc::new(index), None)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn index(&self) -> &LabelIndex {
        &self.index
    }

    /// Shared handle to the index.
    pub fn index_arc(&self) -> Arc<LabelIndex> {
        Arc::clone(&self.index)
    }

    pub fn labels(&self) -> &[Label] {
        self.index.labels()
    }

    pub fn keys(&self) -> &[Label] {
        self.index.labels()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> Kind {
        self.values.kind()
    }

    pub fn can_hold_missing(&self) -> bool {
        self.values.can_hold_missing()
    }

    /// True when both arrays hold the same index allocation.
    pub fn shares_index_with(&self, other: &Series) -> bool {
        Arc::ptr_eq(&self.index, &other.index)
    }

    /// Same index and name, new values.
    pub(crate) fn derive(&self, values: Values) -> Result<Series> {
        Self::from_parts(values, Arc::clone(&self.index), self.name.clone())
    }

    /// Same name, new values and index.
    pub(crate) fn derive_with_index(&self, values: Values, index: LabelIndex) -> Result<Series> {
        Self::from_parts(values, Arc::new(index), self.name.clone())
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.index.contains(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, Scalar)> + '_ {
        self.index.iter().zip(self.values.iter())
    }

    pub fn to_pairs(&self) -> Vec<(Label, Scalar)> {
        self.iter().map(|(label, value)| (label.clone(), value)).collect()
    }

    /// Label-to-value map; with duplicate labels the last value wins.
    pub fn to_map(&self) -> BTreeMap<Label, Scalar> {
        self.iter().map(|(label, value)| (label.clone(), value)).collect()
    }

    pub fn to_f64(&self) -> Result<Vec<f64>> {
        self.values.to_f64()
    }

    pub fn astype(&self, kind: Kind) -> Result<Series> {
        self.derive(self.values.astype(kind)?)
    }

    pub(crate) fn take_positions(&self, positions: &[usize]) -> Result<Series> {
        let values = self.values.take(positions)?;
        let index = self.index.take(positions)?;
        self.derive_with_index(values, index)
    }

    /// Selects by physical position; negative positions count from the end.
    pub fn take(&self, positions: &[isize]) -> Result<Series> {
        let resolved = positions
            .iter()
            .map(|&pos| normalize_position(pos, self.len()))
            .collect::<Result<Vec<_>>>()?;
        self.take_positions(&resolved)
    }

    pub(crate) fn slice_positions(&self, start: usize, end: usize) -> Series {
        Self {
            values: self.values.slice(start, end),
            index: Arc::new(self.index.slice(start, end)),
            name: self.name.clone(),
        }
    }

    pub fn head(&self, n: usize) -> Series {
        self.slice_positions(0, n)
    }

    pub fn tail(&self, n: usize) -> Series {
        self.slice_positions(self.len().saturating_sub(n), self.len())
    }

    /// Repeats every element (and its label) `repeats` times in place.
    pub fn repeat(&self, repeats: usize) -> Result<Series> {
        let positions: Vec<usize> = (0..self.len())
            .flat_map(|pos| std::iter::repeat_n(pos, repeats))
            .collect();
        self.take_positions(&positions)
    }

    /// Labels and values equal, missing equal to missing; names ignored.
    pub fn equals(&self, other: &Series) -> bool {
        self.index.equals(&other.index) && self.values.equals(&other.values)
    }
}

impl PartialEq for Series {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}
