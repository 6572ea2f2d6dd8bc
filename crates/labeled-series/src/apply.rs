// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::series::Series;
use labeled_core::{NaAction, Result, Scalar, SeriesError, Values};
use labeled_index::Label;
use std::sync::Arc;

/// What an [`Series::apply`] closure receives.
#[derive(Clone, Copy, Debug)]
pub enum ApplyArg<'a> {
    /// The whole array, tried first.
    Whole(&'a Series),
    /// One element, used when the whole-array call fails.
    Element(&'a Scalar),
}

/// What an [`Series::apply`] closure returns.
#[derive(Clone, Debug, PartialEq)]
pub enum ApplyOut {
    Values(Values),
    Scalar(Scalar),
}

impl Series {
    /// Transforms every element; with [`NaAction::Ignore`] missing
    /// elements skip `func` and stay missing.
    pub fn map(
        &self,
        mut func: impl FnMut(&Scalar) -> Scalar,
        na_action: NaAction,
    ) -> Result<Series> {
        let out: Vec<Scalar> = self
            .values
            .iter()
            .map(|value| {
                if na_action == NaAction::Ignore && value.is_missing() {
                    Scalar::Missing
                } else {
                    func(&value)
                }
            })
            .collect();
        self.derive(Values::from_scalars(out, None)?)
    }

    /// Looks every element up as a label of `lookup`; elements with no
    /// matching label map to missing.
    pub fn map_series(&self, lookup: &Series, na_action: NaAction) -> Result<Series> {
        self.map(
            |value| {
                Label::from_scalar(value)
                    .ok()
                    .and_then(|label| lookup.index.get_position(&label))
                    .and_then(|located| lookup.values.get(located.first()))
                    .unwrap_or(Scalar::Missing)
            },
            na_action,
        )
    }

    /// Runs `func` on the whole array, falling back to one call per
    /// element when that fails or does not return a same-length buffer.
    pub fn apply(
        &self,
        mut func: impl FnMut(ApplyArg<'_>) -> Result<ApplyOut>,
    ) -> Result<Series> {
        match func(ApplyArg::Whole(self)) {
            Ok(ApplyOut::Values(values)) if values.len() == self.len() => {
                return self.derive(values);
            }
            Ok(_) => tracing::debug!(len = self.len(), "whole-array apply changed shape; applying per element"),
            Err(err) => tracing::debug!(%err, "whole-array apply failed; applying per element"),
        }
        let mut out = Vec::with_capacity(self.len());
        for value in self.values.iter() {
            let scalar = match func(ApplyArg::Element(&value))? {
                ApplyOut::Scalar(scalar) => scalar,
                ApplyOut::Values(values) if values.len() == 1 => {
                    values.get(0).unwrap_or(Scalar::Missing)
                }
                ApplyOut::Values(values) => {
                    return Err(SeriesError::not_supported(format!(
                        "per-element apply returned {} values for one element",
                        values.len()
                    )));
                }
            };
            out.push(scalar);
        }
        self.derive(Values::from_scalars(out, None)?)
    }

    /// Relabels through `mapper`, keeping values in place.
    pub fn rename_labels(&self, mapper: impl FnMut(&Label) -> Label) -> Result<Series> {
        self.derive_with_index(self.values.clone(), self.index.rename(mapper))
    }

    /// In-place [`Series::rename_labels`]; a shared index is cloned first.
    pub fn rename_labels_inplace(&mut self, mapper: impl FnMut(&Label) -> Label) {
        Arc::make_mut(&mut self.index).relabel(mapper);
    }
}
