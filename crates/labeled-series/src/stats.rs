// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::series::Series;
use labeled_core::kernels::{nancorr, nancov, quantile};
use labeled_core::{CumKernel, Kind, Result, Scalar, ScalarKey, SeriesError, Values};
use labeled_index::{JoinHow, Label, LabelIndex};
use std::collections::HashMap;

fn is_integral(value: Option<f64>) -> bool {
    value.is_none_or(|v| v.fract() == 0.0)
}

impl Series {
    fn cumulative(&self, kernel: CumKernel, skipna: bool) -> Result<Series> {
        if let Values::Int(ints) = &self.values {
            return self.derive(Values::Int(kernel.apply_i64(ints)));
        }
        self.derive(Values::Float(kernel.apply(&self.to_f64()?, skipna)))
    }

    /// Running sum; missing values stay missing and, with `skipna`, the
    /// sum carries across them.
    pub fn cumsum(&self, skipna: bool) -> Result<Series> {
        self.cumulative(CumKernel::Sum, skipna)
    }

    pub fn cumprod(&self, skipna: bool) -> Result<Series> {
        self.cumulative(CumKernel::Prod, skipna)
    }

    pub fn cummax(&self, skipna: bool) -> Result<Series> {
        self.cumulative(CumKernel::Max, skipna)
    }

    pub fn cummin(&self, skipna: bool) -> Result<Series> {
        self.cumulative(CumKernel::Min, skipna)
    }

    /// Linear-interpolated quantile of the non-missing values.
    pub fn quantile(&self, q: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&q) {
            return Err(SeriesError::invalid_input(format!(
                "quantile must be in [0, 1]; got {q}"
            )));
        }
        Ok(quantile(&self.to_f64()?, q))
    }

    fn paired(&self, other: &Series) -> Result<(Vec<f64>, Vec<f64>)> {
        let aligned = self.align_values(other, JoinHow::Inner, None)?;
        Ok((aligned.left.to_f64()?, aligned.right.to_f64()?))
    }

    /// Pearson correlation over labels both arrays share, ignoring pairs
    /// with a missing side.
    pub fn corr(&self, other: &Series) -> Result<f64> {
        let (a, b) = self.paired(other)?;
        Ok(nancorr(&a, &b))
    }

    /// Sample covariance over shared labels.
    pub fn cov(&self, other: &Series) -> Result<f64> {
        let (a, b) = self.paired(other)?;
        Ok(nancov(&a, &b, 1))
    }

    /// `self - self.shift(periods)`.
    pub fn diff(&self, periods: i64) -> Result<Series> {
        let current = self.to_f64()?;
        let shifted = self.shift(periods)?.to_f64()?;
        self.derive(Values::Float(
            current.iter().zip(&shifted).map(|(a, b)| a - b).collect(),
        ))
    }

    /// Correlation with the array shifted by `lag` positions.
    pub fn autocorr(&self, lag: i64) -> Result<f64> {
        let current = self.to_f64()?;
        let shifted = self.shift(lag)?.to_f64()?;
        Ok(nancorr(&current, &shifted))
    }

    /// Bounds values to `[lower, upper]`; missing values pass through.
    ///
    /// Int arrays stay int when both bounds are whole numbers.
    pub fn clip(&self, lower: Option<f64>, upper: Option<f64>) -> Result<Series> {
        if let (Some(lo), Some(hi)) = (lower, upper)
            && lo > hi
        {
            return Err(SeriesError::invalid_input(format!(
                "clip lower bound {lo} exceeds upper bound {hi}"
            )));
        }
        let clipped: Vec<f64> = self
            .to_f64()?
            .into_iter()
            .map(|v| {
                let v = lower.map_or(v, |lo| if v < lo { lo } else { v });
                upper.map_or(v, |hi| if v > hi { hi } else { v })
            })
            .collect();
        let values = Values::Float(clipped);
        if self.kind() == Kind::Int && is_integral(lower) && is_integral(upper) {
            return self.derive(values.astype(Kind::Int)?);
        }
        self.derive(values)
    }

    pub fn clip_lower(&self, threshold: f64) -> Result<Series> {
        self.clip(Some(threshold), None)
    }

    pub fn clip_upper(&self, threshold: f64) -> Result<Series> {
        self.clip(None, Some(threshold))
    }

    /// Rounds half to even at `decimals` places; negative places round to
    /// tens, hundreds, and so on.
    pub fn round(&self, decimals: i32) -> Result<Series> {
        if self.kind() == Kind::Int && decimals >= 0 {
            return Ok(self.clone());
        }
        let scale = 10f64.powi(decimals.abs());
        let rounded = Values::Float(
            self.to_f64()?
                .into_iter()
                .map(|v| {
                    if decimals >= 0 {
                        (v * scale).round_ties_even() / scale
                    } else {
                        (v / scale).round_ties_even() * scale
                    }
                })
                .collect(),
        );
        if self.kind() == Kind::Int {
            return self.derive(rounded.astype(Kind::Int)?);
        }
        self.derive(rounded)
    }

    /// Distinct values in order of first appearance, missing included once.
    pub fn unique(&self) -> Result<Values> {
        let mut seen = std::collections::HashSet::new();
        let positions: Vec<usize> = self
            .values
            .iter()
            .enumerate()
            .filter(|(_, value)| seen.insert(value.key()))
            .map(|(pos, _)| pos)
            .collect();
        self.values.take(&positions)
    }

    /// Number of distinct non-missing values.
    pub fn nunique(&self) -> usize {
        self.values
            .iter()
            .filter(|value| !value.is_missing())
            .map(|value| value.key())
            .collect::<std::collections::HashSet<_>>()
            .len()
    }

    /// Occurrences of each distinct non-missing value, most frequent first;
    /// ties keep first-appearance order.
    pub fn value_counts(&self) -> Result<Series> {
        let mut order: Vec<Scalar> = Vec::new();
        let mut counts: HashMap<ScalarKey, i64> = HashMap::new();
        for value in self.values.iter().filter(|value| !value.is_missing()) {
            let count = counts.entry(value.key()).or_insert(0);
            if *count == 0 {
                order.push(value.clone());
            }
            *count += 1;
        }
        let mut tallied: Vec<(Scalar, i64)> = order
            .into_iter()
            .map(|value| {
                let count = counts.get(&value.key()).copied().unwrap_or_default();
                (value, count)
            })
            .collect();
        tallied.sort_by(|a, b| b.1.cmp(&a.1));
        let labels: Vec<Label> = tallied
            .iter()
            .map(|(value, _)| Label::from_scalar(value).unwrap_or_else(|_| Label::from(value.to_string())))
            .collect();
        let counts: Vec<i64> = tallied.into_iter().map(|(_, count)| count).collect();
        self.derive_with_index(Values::Int(counts), LabelIndex::new(labels))
    }
}
