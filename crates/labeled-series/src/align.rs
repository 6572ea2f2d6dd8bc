// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::fill::FillSpec;
use crate::series::Series;
use labeled_core::{FillMethod, Result, Scalar, Values, fill::validate_limit};
use labeled_index::{JoinHow, LabelIndex};
use std::sync::Arc;

/// Options for [`Series::align`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AlignOptions {
    pub join: JoinHow,
    /// When false, a result may share its index with an input.
    pub copy: bool,
    /// Written into slots a side lacks instead of the missing sentinel.
    pub fill_value: Option<Scalar>,
    /// Method fill applied to both results after joining.
    pub method: Option<FillMethod>,
    pub limit: Option<usize>,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            join: JoinHow::Outer,
            copy: true,
            fill_value: None,
            method: None,
            limit: None,
        }
    }
}

impl AlignOptions {
    pub fn validate(&self) -> Result<()> {
        validate_limit(self.limit)?;
        if self.method.is_some() && self.fill_value.is_some() {
            return Err(labeled_core::SeriesError::invalid_input(
                "align accepts either fill_value or method, not both",
            ));
        }
        Ok(())
    }
}

/// Two value buffers laid out over one joined index.
#[derive(Clone, Debug)]
pub(crate) struct Aligned {
    pub index: Arc<LabelIndex>,
    pub left: Values,
    pub right: Values,
}

impl Series {
    /// Aligns both buffers onto a common index.
    ///
    /// Equal indexes skip the join and share the left index. Otherwise
    /// slots a side lacks gather the missing sentinel (or `fill`), which
    /// fails for int buffers that need one.
    pub(crate) fn align_values(
        &self,
        other: &Series,
        how: JoinHow,
        fill: Option<&Scalar>,
    ) -> Result<Aligned> {
        if Arc::ptr_eq(&self.index, &other.index) || self.index.equals(&other.index) {
            tracing::debug!(len = self.len(), "alignment fast path: equal indexes");
            return Ok(Aligned {
                index: Arc::clone(&self.index),
                left: self.values.clone(),
                right: other.values.clone(),
            });
        }
        let joined = self.index.join(&other.index, how);
        tracing::debug!(
            how = how.as_str(),
            left_len = self.len(),
            right_len = other.len(),
            joined_len = joined.len(),
            left_missing = joined.left_missing(),
            right_missing = joined.right_missing(),
            "aligned series"
        );
        let gather = |values: &Values, positions: &[Option<usize>]| match fill {
            Some(fill) => values.gather_or(positions, fill),
            None => values.gather(positions),
        };
        let left = gather(&self.values, &joined.left)?;
        let right = gather(&other.values, &joined.right)?;
        Ok(Aligned {
            index: Arc::new(joined.index),
            left,
            right,
        })
    }

    /// Conforms two arrays to their joined index.
    pub fn align(&self, other: &Series, options: &AlignOptions) -> Result<(Series, Series)> {
        options.validate()?;
        let aligned = self.align_values(other, options.join, options.fill_value.as_ref())?;
        let (left_index, right_index) = if options.copy {
            (
                Arc::new((*aligned.index).clone()),
                Arc::new((*aligned.index).clone()),
            )
        } else {
            (Arc::clone(&aligned.index), aligned.index)
        };
        let mut left = Series::from_parts(aligned.left, left_index, self.name.clone())?;
        let mut right = Series::from_parts(aligned.right, right_index, other.name.clone())?;
        if let Some(method) = options.method {
            let spec = FillSpec::Method(method);
            let fill = crate::fill::FillOptions {
                limit: options.limit,
            };
            left = left.fillna(&spec, &fill)?;
            right = right.fillna(&spec, &fill)?;
        }
        Ok((left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::AlignOptions;
    use crate::series::Series;
    use labeled_core::{FillMethod, Kind, Scalar, SeriesError};
    use labeled_index::{JoinHow, Label, LabelIndex};

    fn labeled(values: Vec<f64>, labels: &[&str]) -> Series {
        let index: LabelIndex = labels.iter().map(|s| Label::from(*s)).collect();
        Series::with_index(values, index).expect("lengths match")
    }

    #[test]
    fn disjoint_outer_alignment_marks_absent_labels_missing() {
        let a = labeled(vec![1.0, 2.0], &["a", "b"]);
        let b = labeled(vec![3.0], &["c"]);
        let (la, lb) = a.align(&b, &AlignOptions::default()).expect("align");
        assert_eq!(la.labels(), lb.labels());
        assert_eq!(la.len(), 3);
        assert!(la.values().is_missing_at(2));
        assert!(lb.values().is_missing_at(0));
        assert!(!la.shares_index_with(&lb));
    }

    #[test]
    fn equal_indexes_take_the_fast_path_and_share_without_copy() {
        let a = labeled(vec![1.0, 2.0], &["a", "b"]);
        let b = labeled(vec![3.0, 4.0], &["a", "b"]);
        let options = AlignOptions {
            copy: false,
            ..AlignOptions::default()
        };
        let (la, lb) = a.align(&b, &options).expect("align");
        assert!(la.shares_index_with(&a));
        assert!(lb.shares_index_with(&a));
        assert_eq!(lb.to_f64().expect("numeric"), vec![3.0, 4.0]);
    }

    #[test]
    fn int_alignment_needing_missing_slots_fails() {
        let a = Series::new(vec![1i64, 2]);
        let b = Series::new(vec![1i64, 2, 3]);
        let err = a.align(&b, &AlignOptions::default()).expect_err("int hole");
        assert!(matches!(err, SeriesError::UnrepresentableMissing(_)));

        let inner = AlignOptions {
            join: JoinHow::Inner,
            ..AlignOptions::default()
        };
        let (la, _) = a.align(&b, &inner).expect("inner join needs no holes");
        assert_eq!(la.kind(), Kind::Int);

        let filled = AlignOptions {
            fill_value: Some(Scalar::Int(0)),
            ..AlignOptions::default()
        };
        let (la, _) = a.align(&b, &filled).expect("fill value avoids holes");
        assert_eq!(la.values().get(2), Some(Scalar::Int(0)));
    }

    #[test]
    fn method_fill_runs_after_the_join() {
        let a = labeled(vec![1.0, 3.0], &["a", "c"]);
        let b = labeled(vec![2.0], &["b"]);
        let options = AlignOptions {
            method: Some(FillMethod::Pad),
            ..AlignOptions::default()
        };
        let (la, lb) = a.align(&b, &options).expect("align");
        assert_eq!(la.to_f64().expect("numeric"), vec![1.0, 1.0, 3.0]);
        let right = lb.to_f64().expect("numeric");
        assert!(right[0].is_nan());
        assert_eq!(&right[1..], &[2.0, 2.0]);

        let bad = AlignOptions {
            method: Some(FillMethod::Pad),
            fill_value: Some(Scalar::Int(0)),
            ..AlignOptions::default()
        };
        assert!(a.align(&b, &bad).is_err());
    }

    #[test]
    fn align_keeps_each_side_name() {
        let a = labeled(vec![1.0], &["a"]).named("left");
        let b = labeled(vec![2.0], &["b"]).named("right");
        let (la, lb) = a.align(&b, &AlignOptions::default()).expect("align");
        assert_eq!(la.name(), Some("left"));
        assert_eq!(lb.name(), Some("right"));
    }
}
