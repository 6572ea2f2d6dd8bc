// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::grouping::LevelGrouper;
use crate::series::Series;
use labeled_core::kernels::{nanargmax, nanargmin};
use labeled_core::{Kind, NanKernel, Result, Scalar, SeriesError, Values};
use labeled_index::Label;
use std::cmp::Ordering;

/// Options shared by every reduction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReduceOptions {
    /// Exclude missing values; when false any missing value makes the
    /// result missing.
    pub skipna: bool,
    /// Reduce per distinct component of this index level.
    pub level: Option<usize>,
    /// Delta degrees of freedom for `Var` and `Std`.
    pub ddof: usize,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            skipna: true,
            level: None,
            ddof: 1,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stat {
    Sum,
    Prod,
    Mean,
    Median,
    Min,
    Max,
    Var,
    Std,
    Skew,
    Kurt,
    Mad,
    Count,
}

impl Stat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Prod => "prod",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
            Self::Var => "var",
            Self::Std => "std",
            Self::Skew => "skew",
            Self::Kurt => "kurt",
            Self::Mad => "mad",
            Self::Count => "count",
        }
    }

    fn kernel(self, ddof: usize) -> Option<NanKernel> {
        Some(match self {
            Self::Sum => NanKernel::Sum,
            Self::Prod => NanKernel::Prod,
            Self::Mean => NanKernel::Mean,
            Self::Median => NanKernel::Median,
            Self::Min => NanKernel::Min,
            Self::Max => NanKernel::Max,
            Self::Var => NanKernel::Var { ddof },
            Self::Std => NanKernel::Std { ddof },
            Self::Skew => NanKernel::Skew,
            Self::Kurt => NanKernel::Kurt,
            Self::Mad => NanKernel::Mad,
            Self::Count => return None,
        })
    }
}

/// A reduction result: one scalar, or one per level group.
#[derive(Clone, Debug, PartialEq)]
pub enum Reduced {
    Scalar(Scalar),
    Series(Series),
}

impl Reduced {
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
}

/// Position of the first extreme non-missing value under scalar ordering.
///
/// `None` when nothing qualifies or, without `skipna`, when a value is
/// missing. Values that do not order against each other are an error.
fn scalar_extreme(values: &Values, want: Ordering, skipna: bool) -> Result<Option<usize>> {
    if !skipna && values.missing_count() > 0 {
        return Ok(None);
    }
    let mut best: Option<(usize, Scalar)> = None;
    for (pos, value) in values.iter().enumerate() {
        if value.is_missing() {
            continue;
        }
        match &best {
            None => best = Some((pos, value)),
            Some((_, current)) => match value.compare(current) {
                Some(ord) if ord == want => best = Some((pos, value)),
                Some(_) => {}
                None => {
                    return Err(SeriesError::not_supported(format!(
                        "ordering {value} against {current}"
                    )));
                }
            },
        }
    }
    Ok(best.map(|(pos, _)| pos))
}

/// Reduces one buffer. Int sums, products and extremes stay exact; object
/// and datetime extremes use scalar ordering; everything else runs the
/// masked float kernels.
pub(crate) fn reduce_values(values: &Values, stat: Stat, options: &ReduceOptions) -> Result<Scalar> {
    if stat == Stat::Count {
        return Ok(Scalar::Int((values.len() - values.missing_count()) as i64));
    }
    match (values, stat) {
        (Values::Int(v), Stat::Sum) => {
            return Ok(Scalar::Int(v.iter().fold(0i64, |acc, x| acc.wrapping_add(*x))));
        }
        (Values::Int(v), Stat::Prod) => {
            return Ok(Scalar::Int(v.iter().fold(1i64, |acc, x| acc.wrapping_mul(*x))));
        }
        (Values::Int(v), Stat::Min) => return Ok(v.iter().min().copied().into()),
        (Values::Int(v), Stat::Max) => return Ok(v.iter().max().copied().into()),
        (Values::Object(_) | Values::Datetime(_), Stat::Min | Stat::Max) => {
            let want = if stat == Stat::Min {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            return Ok(scalar_extreme(values, want, options.skipna)?
                .and_then(|pos| values.get(pos))
                .unwrap_or_default());
        }
        _ => {}
    }
    let Some(kernel) = stat.kernel(options.ddof) else {
        return Ok(Scalar::Missing);
    };
    let numeric = values.to_f64().map_err(|_| {
        SeriesError::not_supported(format!("{} of {} values", stat.as_str(), values.kind()))
    })?;
    Ok(Scalar::Float(kernel.apply(&numeric, options.skipna)))
}

impl Series {
    /// Runs a reduction, per level group when `options.level` is set.
    pub fn reduce(&self, stat: Stat, options: &ReduceOptions) -> Result<Reduced> {
        let Some(level) = options.level else {
            return reduce_values(&self.values, stat, options).map(Reduced::Scalar);
        };
        let grouper = LevelGrouper::new(&self.index, level)?;
        tracing::debug!(
            stat = stat.as_str(),
            level,
            groups = grouper.len(),
            "level-grouped reduction"
        );
        let flat = ReduceOptions {
            level: None,
            ..*options
        };
        let (index, results) =
            grouper.aggregate(&self.values, |group| reduce_values(group, stat, &flat))?;
        let kind = (stat == Stat::Count).then_some(Kind::Int);
        let values = Values::from_scalars(results, kind)?;
        self.derive_with_index(values, index).map(Reduced::Series)
    }

    fn reduce_f64(&self, stat: Stat) -> Result<f64> {
        let value = reduce_values(&self.values, stat, &ReduceOptions::default())?;
        Ok(value.as_f64().unwrap_or(f64::NAN))
    }

    pub fn sum(&self) -> Result<f64> {
        self.reduce_f64(Stat::Sum)
    }

    pub fn prod(&self) -> Result<f64> {
        self.reduce_f64(Stat::Prod)
    }

    pub fn mean(&self) -> Result<f64> {
        self.reduce_f64(Stat::Mean)
    }

    pub fn median(&self) -> Result<f64> {
        self.reduce_f64(Stat::Median)
    }

    /// Sample variance (`ddof = 1`).
    pub fn var(&self) -> Result<f64> {
        self.reduce_f64(Stat::Var)
    }

    /// Sample standard deviation (`ddof = 1`).
    pub fn std(&self) -> Result<f64> {
        self.reduce_f64(Stat::Std)
    }

    pub fn skew(&self) -> Result<f64> {
        self.reduce_f64(Stat::Skew)
    }

    pub fn kurt(&self) -> Result<f64> {
        self.reduce_f64(Stat::Kurt)
    }

    /// Mean absolute deviation.
    pub fn mad(&self) -> Result<f64> {
        self.reduce_f64(Stat::Mad)
    }

    pub fn min(&self) -> Result<Scalar> {
        reduce_values(&self.values, Stat::Min, &ReduceOptions::default())
    }

    pub fn max(&self) -> Result<Scalar> {
        reduce_values(&self.values, Stat::Max, &ReduceOptions::default())
    }

    /// Number of non-missing values.
    pub fn count(&self) -> usize {
        self.len() - self.values.missing_count()
    }

    fn arg_extreme(&self, want: Ordering, skipna: bool) -> Result<Option<Label>> {
        let pos = match self.values.to_f64() {
            Ok(numeric) if want == Ordering::Less => nanargmin(&numeric, skipna),
            Ok(numeric) => nanargmax(&numeric, skipna),
            Err(_) => scalar_extreme(&self.values, want, skipna)?,
        };
        Ok(pos.and_then(|pos| self.index.get(pos).cloned()))
    }

    /// Label of the first minimum; `None` when no value qualifies.
    pub fn idxmin(&self, skipna: bool) -> Result<Option<Label>> {
        self.arg_extreme(Ordering::Less, skipna)
    }

    /// Label of the first maximum; `None` when no value qualifies.
    pub fn idxmax(&self, skipna: bool) -> Result<Option<Label>> {
        self.arg_extreme(Ordering::Greater, skipna)
    }
}

#[cfg(test)]
mod tests {
    use super::{ReduceOptions, Stat};
    use crate::series::Series;
    use chrono::NaiveDate;
    use labeled_core::{Kind, Scalar, SeriesError, Values};
    use labeled_index::{Label, LabelIndex};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn reductions_skip_missing_by_default() {
        let s = Series::new(vec![1.0, f64::NAN, 3.0]);
        assert_close(s.sum().expect("sum"), 4.0);
        assert_close(s.mean().expect("mean"), 2.0);
        assert_close(s.median().expect("median"), 2.0);
        assert_eq!(s.count(), 2);

        let strict = ReduceOptions {
            skipna: false,
            ..ReduceOptions::default()
        };
        let value = s.reduce(Stat::Sum, &strict).expect("sum").into_scalar().expect("scalar");
        assert!(value.is_missing());
    }

    #[test]
    fn variance_uses_sample_normalization_unless_overridden() {
        let s = Series::new(vec![1.0, 2.0, 3.0, 4.0]);
        assert_close(s.var().expect("var"), 5.0 / 3.0);
        let population = ReduceOptions {
            ddof: 0,
            ..ReduceOptions::default()
        };
        let var = s.reduce(Stat::Var, &population).expect("var").into_scalar().expect("scalar");
        assert_close(var.as_f64().expect("float"), 1.25);
        assert_close(s.std().expect("std"), (5.0f64 / 3.0).sqrt());
        assert_close(s.mad().expect("mad"), 1.0);
    }

    #[test]
    fn int_sums_and_extremes_stay_exact() {
        let s = Series::new(vec![3i64, -1, 7]);
        let sum = s
            .reduce(Stat::Sum, &ReduceOptions::default())
            .expect("sum")
            .into_scalar()
            .expect("scalar");
        assert_eq!(sum, Scalar::Int(9));
        assert_eq!(s.min().expect("min"), Scalar::Int(-1));
        assert_eq!(s.max().expect("max"), Scalar::Int(7));
        assert_close(s.prod().expect("prod"), -21.0);
    }

    #[test]
    fn object_and_datetime_extremes_use_scalar_ordering() {
        let text = Series::from_scalars(
            vec![Scalar::from("pear"), Scalar::Missing, Scalar::from("apple")],
            None,
            None,
        )
        .expect("object");
        assert_eq!(text.min().expect("min"), Scalar::from("apple"));
        assert!(matches!(text.sum(), Err(SeriesError::NotSupported(_))));

        let mixed = Series::from_scalars(vec![Scalar::from("a"), Scalar::Int(1)], None, None)
            .expect("object");
        assert!(mixed.max().is_err());

        let day = |d: u32| {
            NaiveDate::from_ymd_opt(2012, 1, d)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .expect("valid date")
        };
        let stamps = Series::new(vec![day(3), day(1)]);
        assert_eq!(stamps.max().expect("max"), Scalar::from(day(3)));
        assert_eq!(stamps.idxmin(true).expect("idxmin"), Some(Label::from(1)));
    }

    #[test]
    fn idx_extremes_return_labels() {
        let index: LabelIndex = ["a", "b", "c"].iter().map(|s| Label::from(*s)).collect();
        let s = Series::with_index(vec![2.0, 5.0, f64::NAN], index).expect("labeled");
        assert_eq!(s.idxmax(true).expect("idxmax"), Some(Label::from("b")));
        assert_eq!(s.idxmin(true).expect("idxmin"), Some(Label::from("a")));
        assert_eq!(s.idxmax(false).expect("strict"), None);
        assert_eq!(Series::new(Vec::<f64>::new()).idxmin(true).expect("empty"), None);
    }

    #[test]
    fn level_reductions_group_by_component() {
        let index = LabelIndex::from_levels(vec![
            vec![Label::from("a"), Label::from("a"), Label::from("b")],
            vec![Label::from(1), Label::from(2), Label::from(1)],
        ])
        .expect("levels");
        let s = Series::with_index(vec![1.0, f64::NAN, 4.0], index)
            .expect("labeled")
            .named("x");
        let options = ReduceOptions {
            level: Some(0),
            ..ReduceOptions::default()
        };
        let sums = s.reduce(Stat::Sum, &options).expect("sum").into_series().expect("series");
        assert_eq!(sums.labels(), &[Label::from("a"), Label::from("b")]);
        assert_eq!(sums.to_f64().expect("numeric"), vec![1.0, 4.0]);
        assert_eq!(sums.name(), Some("x"));

        let counts = s
            .reduce(Stat::Count, &ReduceOptions { level: Some(1), ..ReduceOptions::default() })
            .expect("count")
            .into_series()
            .expect("series");
        assert_eq!(counts.kind(), Kind::Int);
        assert!(counts.values().equals(&Values::Int(vec![2, 0])));
    }
}
