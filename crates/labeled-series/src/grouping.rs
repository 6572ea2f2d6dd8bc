// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use labeled_core::{Result, Scalar, Values};
use labeled_index::{Label, LabelIndex};
use std::collections::BTreeMap;

/// Groups the positions of an index by the component at one level.
///
/// Groups come out in label order; positions inside a group keep index
/// order.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelGrouper {
    level: usize,
    keys: Vec<Label>,
    groups: Vec<Vec<usize>>,
}

impl LevelGrouper {
    pub fn new(index: &LabelIndex, level: usize) -> Result<Self> {
        let mut by_key: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
        for (pos, key) in index.level_values(level)?.into_iter().enumerate() {
            by_key.entry(key).or_default().push(pos);
        }
        let (keys, groups) = by_key.into_iter().unzip();
        Ok(Self {
            level,
            keys,
            groups,
        })
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[Label] {
        &self.keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, &[usize])> + '_ {
        self.keys.iter().zip(self.groups.iter().map(Vec::as_slice))
    }

    /// Reduces every group of `values` to one scalar.
    pub fn aggregate(
        &self,
        values: &Values,
        mut reduce: impl FnMut(&Values) -> Result<Scalar>,
    ) -> Result<(LabelIndex, Vec<Scalar>)> {
        let results = self
            .groups
            .iter()
            .map(|positions| reduce(&values.take(positions)?))
            .collect::<Result<Vec<_>>>()?;
        Ok((LabelIndex::new(self.keys.clone()), results))
    }
}
