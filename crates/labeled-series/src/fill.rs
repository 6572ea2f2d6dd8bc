// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::series::Series;
use labeled_core::fill::validate_limit;
use labeled_core::values::accepts;
use labeled_core::{FillMethod, Kind, Result, Scalar, ScalarKey, SeriesError, Values};
use labeled_index::{IndexKind, Label};
use std::collections::HashMap;

/// What `fillna` writes into missing slots.
#[derive(Clone, Debug, PartialEq)]
pub enum FillSpec {
    Value(Scalar),
    Method(FillMethod),
}

/// Options for `fillna`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FillOptions {
    /// Method fills: longest run of consecutive fills. Value fills: most
    /// slots filled overall.
    pub limit: Option<usize>,
}

impl FillOptions {
    pub fn validate(&self) -> Result<()> {
        validate_limit(self.limit)
    }
}

/// Replacement rules for [`Series::replace`].
#[derive(Clone, Debug, PartialEq)]
pub enum ReplaceSpec {
    Single { from: Scalar, to: Scalar },
    Many { from: Vec<Scalar>, to: Scalar },
    Pairwise { from: Vec<Scalar>, to: Vec<Scalar> },
    Map(Vec<(Scalar, Scalar)>),
    /// Matched slots take a neighbouring unmatched value.
    Method {
        from: Vec<Scalar>,
        method: FillMethod,
        limit: Option<usize>,
    },
}

/// Interpolation coordinate.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InterpolateMethod {
    /// Positions are equally spaced.
    #[default]
    Linear,
    /// Numeric label values are the coordinate.
    Values,
    /// Datetime labels are the coordinate.
    Time,
}

/// Writes `fill` at `positions`, widening the buffer kind when the fill
/// does not fit.
pub(crate) fn fill_positions(values: &Values, positions: &[usize], fill: &Scalar) -> Result<Values> {
    if positions.is_empty() {
        return Ok(values.clone());
    }
    if accepts(values.kind(), fill) {
        let mut out = values.clone();
        out.set_many(positions, &vec![fill.clone(); positions.len()])?;
        return Ok(out);
    }
    let mut scalars = values.to_scalars();
    for &pos in positions {
        scalars[pos] = fill.clone();
    }
    let kind = match (values.kind(), fill.kind_hint()) {
        (Kind::Int, None | Some(Kind::Float)) => Kind::Float,
        _ => labeled_core::infer_kind(&scalars),
    };
    Values::from_scalars(scalars, Some(kind))
}

impl Series {
    pub fn isnull(&self) -> Series {
        let mask = self.values.missing_mask();
        Series {
            values: Values::from(mask),
            index: self.index_arc(),
            name: self.name.clone(),
        }
    }

    pub fn notnull(&self) -> Series {
        let mask: Vec<bool> = self.values.missing_mask().into_iter().map(|m| !m).collect();
        Series {
            values: Values::from(mask),
            index: self.index_arc(),
            name: self.name.clone(),
        }
    }

    pub fn dropna(&self) -> Result<Series> {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&pos| !self.values.is_missing_at(pos))
            .collect();
        if keep.len() == self.len() {
            return Ok(self.clone());
        }
        self.take_positions(&keep)
    }

    pub fn first_valid_index(&self) -> Option<Label> {
        (0..self.len())
            .find(|&pos| !self.values.is_missing_at(pos))
            .and_then(|pos| self.index.get(pos).cloned())
    }

    pub fn last_valid_index(&self) -> Option<Label> {
        (0..self.len())
            .rev()
            .find(|&pos| !self.values.is_missing_at(pos))
            .and_then(|pos| self.index.get(pos).cloned())
    }

    /// Fills missing slots by value or by propagating neighbours.
    ///
    /// Filling an int array with a missing value fails; filling it with a
    /// real value is a no-op copy.
    pub fn fillna(&self, spec: &FillSpec, options: &FillOptions) -> Result<Series> {
        options.validate()?;
        match spec {
            FillSpec::Value(value) => {
                if value.is_missing() && !self.can_hold_missing() {
                    return Err(SeriesError::unrepresentable_missing(format!(
                        "cannot fill a {} array with a missing value",
                        self.kind()
                    )));
                }
                let mut positions: Vec<usize> = (0..self.len())
                    .filter(|&pos| self.values.is_missing_at(pos))
                    .collect();
                if let Some(limit) = options.limit {
                    positions.truncate(limit);
                }
                tracing::debug!(filled = positions.len(), "value fill");
                self.derive(fill_positions(&self.values, &positions, value)?)
            }
            FillSpec::Method(method) => {
                let indexer = method.indexer(&self.values.missing_mask(), options.limit);
                tracing::debug!(
                    method = method.as_str(),
                    limit = options.limit,
                    "method fill"
                );
                self.derive(self.values.take(&indexer)?)
            }
        }
    }

    /// In-place `fillna`; on error the array is untouched.
    pub fn fillna_inplace(&mut self, spec: &FillSpec, options: &FillOptions) -> Result<()> {
        let filled = self.fillna(spec, options)?;
        self.values = filled.values;
        Ok(())
    }

    pub fn replace(&self, spec: &ReplaceSpec) -> Result<Series> {
        let matches_any = |from: &[Scalar]| {
            let keys: Vec<ScalarKey> = from.iter().map(Scalar::key).collect();
            self.values
                .iter()
                .map(|value| keys.contains(&value.key()))
                .collect::<Vec<bool>>()
        };
        let scalars = self.values.to_scalars();
        let replaced: Vec<Scalar> = match spec {
            ReplaceSpec::Single { from, to } => {
                return self.replace(&ReplaceSpec::Map(vec![(from.clone(), to.clone())]));
            }
            ReplaceSpec::Many { from, to } => {
                let pairs = from.iter().map(|f| (f.clone(), to.clone())).collect();
                return self.replace(&ReplaceSpec::Map(pairs));
            }
            ReplaceSpec::Pairwise { from, to } => {
                if from.len() != to.len() {
                    return Err(SeriesError::shape_mismatch(from.len(), to.len()));
                }
                let pairs = from.iter().cloned().zip(to.iter().cloned()).collect();
                return self.replace(&ReplaceSpec::Map(pairs));
            }
            ReplaceSpec::Map(pairs) => {
                let lookup: HashMap<ScalarKey, &Scalar> =
                    pairs.iter().map(|(from, to)| (from.key(), to)).collect();
                if !scalars.iter().any(|value| lookup.contains_key(&value.key())) {
                    return Ok(self.clone());
                }
                scalars
                    .into_iter()
                    .map(|value| lookup.get(&value.key()).map_or(value, |to| (*to).clone()))
                    .collect()
            }
            ReplaceSpec::Method {
                from,
                method,
                limit,
            } => {
                validate_limit(*limit)?;
                let indexer = method.indexer(&matches_any(from), *limit);
                return self.derive(self.values.take(&indexer)?);
            }
        };
        let kind = if replaced.iter().all(|v| accepts(self.kind(), v)) {
            Some(self.kind())
        } else {
            None
        };
        self.derive(Values::from_scalars(replaced, kind)?)
    }

    fn interpolation_coordinates(&self, method: InterpolateMethod) -> Result<Vec<f64>> {
        match method {
            InterpolateMethod::Linear => Ok((0..self.len()).map(|pos| pos as f64).collect()),
            InterpolateMethod::Time if self.index.kind() != IndexKind::Datetime => Err(
                SeriesError::invalid_index("time interpolation requires a datetime index"),
            ),
            InterpolateMethod::Time | InterpolateMethod::Values => {
                let strategy = self.index.strategy();
                self.index
                    .iter()
                    .map(|label| {
                        strategy.coordinate(label).ok_or_else(|| {
                            SeriesError::invalid_index(format!(
                                "label {label} has no numeric coordinate for interpolation"
                            ))
                        })
                    })
                    .collect()
            }
        }
    }

    /// Fills missing slots after the first valid value by linear
    /// interpolation; slots past the last valid value repeat it.
    pub fn interpolate(&self, method: InterpolateMethod) -> Result<Series> {
        if self.kind() == Kind::Int {
            return Ok(self.clone());
        }
        let values = self.values.to_f64()?;
        let coords = self.interpolation_coordinates(method)?;
        let valid: Vec<usize> = (0..values.len()).filter(|&i| !values[i].is_nan()).collect();
        let Some(&first) = valid.first() else {
            return self.derive(Values::Float(values));
        };
        let mut out = values.clone();
        let mut next = 0usize;
        for pos in first..values.len() {
            if !values[pos].is_nan() {
                continue;
            }
            while next + 1 < valid.len() && valid[next + 1] < pos {
                next += 1;
            }
            let lo = valid[next];
            out[pos] = match valid.get(next + 1) {
                Some(&hi) => {
                    let span = coords[hi] - coords[lo];
                    if span == 0.0 {
                        values[lo]
                    } else {
                        let t = (coords[pos] - coords[lo]) / span;
                        values[lo] + (values[hi] - values[lo]) * t
                    }
                }
                None => values[lo],
            };
        }
        self.derive(Values::Float(out))
    }
}
