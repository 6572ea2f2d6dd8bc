// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::index::LabelIndex;
use crate::label::Label;
use labeled_core::{Result, SeriesError};
use std::collections::BTreeSet;

/// Set-algebra flavour of a join.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum JoinHow {
    #[default]
    Outer,
    Inner,
    Left,
    Right,
}

impl JoinHow {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Outer => "outer",
            Self::Inner => "inner",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "outer" => Ok(Self::Outer),
            "inner" => Ok(Self::Inner),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(SeriesError::invalid_input(format!(
                "unknown join '{other}'; expected one of outer, inner, left, right"
            ))),
        }
    }
}

/// Joined labels plus one position map per input.
///
/// `left[i]` / `right[i]` is the source position feeding slot `i` of the
/// joined index, or `None` when that side lacks the label.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinResult {
    pub index: LabelIndex,
    pub left: Vec<Option<usize>>,
    pub right: Vec<Option<usize>>,
}

impl JoinResult {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Positions where the left input has no value.
    pub fn left_missing(&self) -> usize {
        self.left.iter().filter(|p| p.is_none()).count()
    }

    pub fn right_missing(&self) -> usize {
        self.right.iter().filter(|p| p.is_none()).count()
    }
}

fn identity(len: usize) -> Vec<Option<usize>> {
    (0..len).map(Some).collect()
}

impl LabelIndex {
    /// Joins two indexes.
    ///
    /// Equal indexes short-circuit to identity maps. With unique inputs,
    /// `Outer` is the sorted union, `Inner` keeps left order, and
    /// `Left`/`Right` keep the driving side verbatim. With duplicates every
    /// label expands to the cartesian product of its matches; `Outer` and
    /// `Inner` are then sorted by label, while `Left`/`Right` expand each
    /// driving position in place.
    pub fn join(&self, other: &LabelIndex, how: JoinHow) -> JoinResult {
        if self.equals(other) {
            tracing::trace!(how = how.as_str(), len = self.len(), "join of equal indexes");
            return JoinResult {
                index: self.clone(),
                left: identity(self.len()),
                right: identity(other.len()),
            };
        }
        let result = if self.is_unique() && other.is_unique() {
            self.join_unique(other, how)
        } else {
            self.join_non_unique(other, how)
        };
        tracing::debug!(
            how = how.as_str(),
            left_len = self.len(),
            right_len = other.len(),
            joined_len = result.len(),
            unique = self.is_unique() && other.is_unique(),
            "joined label indexes"
        );
        result
    }

    fn join_unique(&self, other: &LabelIndex, how: JoinHow) -> JoinResult {
        match how {
            JoinHow::Left => JoinResult {
                index: self.clone(),
                left: identity(self.len()),
                right: other.get_positions(self.labels()),
            },
            JoinHow::Right => JoinResult {
                index: other.clone(),
                left: self.get_positions(other.labels()),
                right: identity(other.len()),
            },
            JoinHow::Inner => {
                let (labels, left, right) = self
                    .iter()
                    .enumerate()
                    .filter_map(|(pos, label)| {
                        other
                            .get_position(label)
                            .map(|found| (label.clone(), Some(pos), Some(found.first())))
                    })
                    .fold(
                        (Vec::new(), Vec::new(), Vec::new()),
                        |(mut labels, mut left, mut right), (label, l, r)| {
                            labels.push(label);
                            left.push(l);
                            right.push(r);
                            (labels, left, right)
                        },
                    );
                JoinResult {
                    index: LabelIndex::new(labels),
                    left,
                    right,
                }
            }
            JoinHow::Outer => {
                let union: Vec<Label> = self
                    .iter()
                    .chain(other.iter())
                    .cloned()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                let left = self.get_positions(&union);
                let right = other.get_positions(&union);
                JoinResult {
                    index: LabelIndex::new(union),
                    left,
                    right,
                }
            }
        }
    }

    fn join_non_unique(&self, other: &LabelIndex, how: JoinHow) -> JoinResult {
        let mut labels = Vec::new();
        let mut left = Vec::new();
        let mut right = Vec::new();
        match how {
            JoinHow::Left => {
                for (pos, label) in self.iter().enumerate() {
                    for r in matches(other, label) {
                        labels.push(label.clone());
                        left.push(Some(pos));
                        right.push(r);
                    }
                }
            }
            JoinHow::Right => {
                for (pos, label) in other.iter().enumerate() {
                    for l in matches(self, label) {
                        labels.push(label.clone());
                        left.push(l);
                        right.push(Some(pos));
                    }
                }
            }
            JoinHow::Outer | JoinHow::Inner => {
                let keys: BTreeSet<&Label> = if how == JoinHow::Outer {
                    self.iter().chain(other.iter()).collect()
                } else {
                    self.iter().filter(|label| other.contains(label)).collect()
                };
                for key in keys {
                    let rm = matches(other, key);
                    for l in matches(self, key) {
                        for &r in &rm {
                            labels.push(key.clone());
                            left.push(l);
                            right.push(r);
                        }
                    }
                }
            }
        }
        JoinResult {
            index: LabelIndex::new(labels),
            left,
            right,
        }
    }

    /// Sorted union of distinct labels.
    pub fn union(&self, other: &LabelIndex) -> LabelIndex {
        self.join(other, JoinHow::Outer).index
    }

    /// Labels present in both, in left order.
    pub fn intersection(&self, other: &LabelIndex) -> LabelIndex {
        self.iter()
            .filter(|label| other.contains(label))
            .cloned()
            .collect::<Vec<_>>()
            .into()
    }
}

/// Every position of `label` in `index`, or a single `None` when absent.
fn matches(index: &LabelIndex, label: &Label) -> Vec<Option<usize>> {
    match index.get_position(label) {
        Some(found) => found.positions().into_iter().map(Some).collect(),
        None => vec![None],
    }
}
