// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::series::Series;
use labeled_core::kernels::quantile;
use labeled_core::missing::{MissingStats, compute_missing_stats};
use labeled_core::{Kind, NanKernel, Result, Scalar, Values};
use labeled_index::{Label, LabelIndex};

/// Descriptive statistics, by element kind.
#[derive(Clone, Debug, PartialEq)]
pub enum SummaryStats {
    Numeric {
        count: usize,
        mean: f64,
        std: f64,
        min: f64,
        q25: f64,
        q50: f64,
        q75: f64,
        max: f64,
    },
    Categorical {
        count: usize,
        unique: usize,
        /// Most frequent value; the earliest wins a tie.
        top: Scalar,
        freq: usize,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    /// Axis description from the index strategy.
    pub axis: String,
    pub missing: MissingStats,
    pub stats: SummaryStats,
}

impl Summary {
    /// The statistics as an array labeled by statistic name.
    pub fn to_series(&self) -> Result<Series> {
        let (names, values): (Vec<&str>, Values) = match &self.stats {
            SummaryStats::Numeric {
                count,
                mean,
                std,
                min,
                q25,
                q50,
                q75,
                max,
            } => (
                vec!["count", "mean", "std", "min", "25%", "50%", "75%", "max"],
                Values::Float(vec![*count as f64, *mean, *std, *min, *q25, *q50, *q75, *max]),
            ),
            SummaryStats::Categorical {
                count,
                unique,
                top,
                freq,
            } => (
                vec!["count", "unique", "top", "freq"],
                Values::Object(vec![
                    Scalar::Int(*count as i64),
                    Scalar::Int(*unique as i64),
                    top.clone(),
                    Scalar::Int(*freq as i64),
                ]),
            ),
        };
        let index: LabelIndex = names.into_iter().map(Label::from).collect();
        Series::with_index(values, index)
    }
}

/// Types that can describe their contents.
pub trait Summarizable {
    fn describe(&self) -> Result<Summary>;
}

impl Summarizable for Series {
    fn describe(&self) -> Result<Summary> {
        let missing = compute_missing_stats(self.len(), self.values.missing_count());
        let stats = match self.kind() {
            Kind::Float | Kind::Int => {
                let values = self.to_f64()?;
                SummaryStats::Numeric {
                    count: missing.valid_count,
                    mean: NanKernel::Mean.apply(&values, true),
                    std: NanKernel::Std { ddof: 1 }.apply(&values, true),
                    min: NanKernel::Min.apply(&values, true),
                    q25: quantile(&values, 0.25),
                    q50: quantile(&values, 0.5),
                    q75: quantile(&values, 0.75),
                    max: NanKernel::Max.apply(&values, true),
                }
            }
            Kind::Bool | Kind::Datetime | Kind::Object => {
                let counts = self.value_counts()?;
                let (top, freq) = counts
                    .index
                    .get(0)
                    .zip(counts.values.get(0))
                    .map_or((Scalar::Missing, 0), |(label, freq)| {
                        (label.to_scalar(), freq.as_i64().unwrap_or_default() as usize)
                    });
                SummaryStats::Categorical {
                    count: missing.valid_count,
                    unique: self.nunique(),
                    top,
                    freq,
                }
            }
        };
        Ok(Summary {
            axis: self.index.strategy().describe(&self.index),
            missing,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Summarizable, SummaryStats};
    use crate::series::Series;
    use labeled_core::{Kind, Scalar};
    use labeled_index::Label;

    #[test]
    fn numeric_summary_skips_missing() {
        let s = Series::new(vec![1.0, 2.0, f64::NAN, 3.0, 4.0]);
        let summary = s.describe().expect("describe");
        assert_eq!(summary.missing.missing_count, 1);
        let SummaryStats::Numeric {
            count,
            mean,
            min,
            q50,
            max,
            ..
        } = summary.stats
        else {
            panic!("expected numeric stats");
        };
        assert_eq!(count, 4);
        assert_eq!(mean, 2.5);
        assert_eq!((min, q50, max), (1.0, 2.5, 4.0));
        assert!(summary.axis.starts_with("integer"));
    }

    #[test]
    fn categorical_summary_reports_top_value() {
        let s = Series::new(vec!["x", "y", "y"]);
        let summary = s.describe().expect("describe");
        assert_eq!(
            summary.stats,
            SummaryStats::Categorical {
                count: 3,
                unique: 2,
                top: Scalar::from("y"),
                freq: 2,
            }
        );
        let table = summary.to_series().expect("series");
        assert_eq!(table.kind(), Kind::Object);
        assert_eq!(table.labels()[2], Label::from("top"));
    }

    #[test]
    fn numeric_summary_renders_as_float_series() {
        let table = Series::new(vec![1i64, 3])
            .describe()
            .and_then(|summary| summary.to_series())
            .expect("describe");
        assert_eq!(table.len(), 8);
        assert_eq!(table.iget(1).expect("mean"), Scalar::Float(2.0));
    }
}
