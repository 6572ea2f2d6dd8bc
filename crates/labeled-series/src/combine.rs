// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::series::{Series, joined_name};
use labeled_core::{Result, Scalar, SeriesError, Values};
use labeled_index::{JoinHow, LabelIndex};
use std::collections::HashSet;
use std::sync::Arc;

impl Series {
    /// Applies `func` to every label of the union, one label at a time.
    ///
    /// A side lacking the label passes `fill` instead. The result kind is
    /// inferred from what `func` returns.
    pub fn combine(
        &self,
        other: &Series,
        mut func: impl FnMut(&Scalar, &Scalar) -> Scalar,
        fill: &Scalar,
    ) -> Result<Series> {
        let joined = self.index.join(&other.index, JoinHow::Outer);
        let side = |values: &Values, pos: Option<usize>| {
            pos.and_then(|p| values.get(p)).unwrap_or_else(|| fill.clone())
        };
        let out: Vec<Scalar> = joined
            .left
            .iter()
            .zip(&joined.right)
            .map(|(&l, &r)| func(&side(&self.values, l), &side(&other.values, r)))
            .collect();
        Series::from_parts(
            Values::from_scalars(out, None)?,
            Arc::new(joined.index),
            joined_name(&self.name, &other.name),
        )
    }

    /// Applies `func` to every element with `value` as the right operand.
    pub fn combine_scalar(
        &self,
        value: &Scalar,
        mut func: impl FnMut(&Scalar, &Scalar) -> Scalar,
    ) -> Result<Series> {
        let out: Vec<Scalar> = self.values.iter().map(|v| func(&v, value)).collect();
        self.derive(Values::from_scalars(out, None)?)
    }

    /// Over the union of labels, this array's value where it has one,
    /// otherwise `other`'s.
    pub fn combine_first(&self, other: &Series) -> Result<Series> {
        let joined = self.index.join(&other.index, JoinHow::Outer);
        let out: Vec<Scalar> = joined
            .left
            .iter()
            .zip(&joined.right)
            .map(|(&l, &r)| {
                l.and_then(|p| self.values.get(p))
                    .filter(|v| !v.is_missing())
                    .or_else(|| r.and_then(|p| other.values.get(p)))
                    .unwrap_or(Scalar::Missing)
            })
            .collect();
        Series::from_parts(
            Values::from_scalars(out, None)?,
            Arc::new(joined.index),
            self.name.clone(),
        )
    }

    /// Overwrites values with `other`'s non-missing values at matching
    /// labels. Either every write lands or none does.
    pub fn update(&mut self, other: &Series) -> Result<()> {
        let mut positions = Vec::new();
        let mut replacements = Vec::new();
        for (pos, source) in other.index.get_positions(self.index.labels()).into_iter().enumerate() {
            if let Some(value) = source.and_then(|p| other.values.get(p))
                && !value.is_missing()
            {
                positions.push(pos);
                replacements.push(value);
            }
        }
        tracing::debug!(updated = positions.len(), len = self.len(), "update from other");
        self.values.set_many(&positions, &replacements)
    }

    /// Concatenates arrays end to end, keeping every label.
    ///
    /// With `verify_integrity`, a label occurring more than once in the
    /// result is an error.
    pub fn append(&self, others: &[&Series], verify_integrity: bool) -> Result<Series> {
        let mut index: LabelIndex = (*self.index).clone();
        let mut name = self.name.clone();
        for other in others {
            index = index.append(&other.index);
            name = joined_name(&name, &other.name);
        }
        if verify_integrity && !index.is_unique() {
            let mut seen = HashSet::new();
            let duplicates: Vec<String> = index
                .iter()
                .filter(|label| !seen.insert(*label))
                .map(ToString::to_string)
                .collect();
            return Err(SeriesError::invalid_index(format!(
                "appended labels overlap: {}",
                duplicates.join(", ")
            )));
        }
        let parts: Vec<&Values> = std::iter::once(&self.values)
            .chain(others.iter().map(|other| &other.values))
            .collect();
        Series::from_parts(Values::concat(&parts)?, Arc::new(index), name)
    }
}
