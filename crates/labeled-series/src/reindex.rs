// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::series::Series;
use labeled_core::fill::validate_limit;
use labeled_core::{FillMethod, Kind, Result, Scalar, SeriesError};
use labeled_index::{Label, LabelIndex, LabelOffset};
use std::sync::Arc;

/// Options for [`Series::reindex`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ReindexOptions {
    /// Fill for target labels absent from the source; needs a monotonic
    /// source index.
    pub method: Option<FillMethod>,
    /// Most targets one source row may feed through `method`.
    pub limit: Option<usize>,
    /// Written where no source row applies, instead of the missing
    /// sentinel.
    pub fill_value: Option<Scalar>,
    /// When false the result shares the target index (or, on the
    /// short-circuit, this array's index).
    pub copy: bool,
}

impl Default for ReindexOptions {
    fn default() -> Self {
        Self {
            method: None,
            limit: None,
            fill_value: None,
            copy: true,
        }
    }
}

impl ReindexOptions {
    pub fn validate(&self) -> Result<()> {
        validate_limit(self.limit)?;
        if self.limit.is_some() && self.method.is_none() {
            return Err(SeriesError::invalid_input(
                "reindex limit requires a fill method",
            ));
        }
        Ok(())
    }
}

impl Series {
    /// Conforms the array to `target`.
    ///
    /// A target equal to the current index short-circuits without a join.
    /// Labels missing from the source become missing values, which an int
    /// array cannot hold unless `fill_value` is given.
    pub fn reindex(
        &self,
        target: Option<Arc<LabelIndex>>,
        options: &ReindexOptions,
    ) -> Result<Series> {
        options.validate()?;
        let target = target.ok_or_else(|| SeriesError::invalid_index("reindex requires a target index"))?;
        if Arc::ptr_eq(&self.index, &target) || self.index.equals(&target) {
            tracing::debug!(len = self.len(), copy = options.copy, "reindex short-circuit");
            let index = if options.copy {
                Arc::new((*self.index).clone())
            } else {
                Arc::clone(&self.index)
            };
            return Series::from_parts(self.values.clone(), index, self.name.clone());
        }
        let indexer = self
            .index
            .reindex_indexer(target.labels(), options.method, options.limit)?;
        let missing = indexer.iter().filter(|p| p.is_none()).count();
        tracing::debug!(
            source_len = self.len(),
            target_len = target.len(),
            missing,
            method = options.method.map(FillMethod::as_str),
            "reindexed series"
        );
        let values = match &options.fill_value {
            Some(fill) => self.values.gather_or(&indexer, fill)?,
            None => self.values.gather(&indexer)?,
        };
        let index = if options.copy {
            Arc::new((*target).clone())
        } else {
            target
        };
        Series::from_parts(values, index, self.name.clone())
    }

    /// Reindexes to an explicit label list with default options.
    pub fn reindex_labels(&self, labels: &[Label]) -> Result<Series> {
        let target = Arc::new(LabelIndex::new(labels.to_vec()));
        let options = ReindexOptions {
            copy: false,
            ..ReindexOptions::default()
        };
        self.reindex(Some(target), &options)
    }

    /// Reindexes onto the labels of `other`.
    pub fn reindex_like(&self, other: &Series, options: &ReindexOptions) -> Result<Series> {
        self.reindex(Some(other.index_arc()), options)
    }

    /// Moves values by `periods` positions, leaving missing values in the
    /// vacated slots. Labels stay put; an int array becomes float.
    pub fn shift(&self, periods: i64) -> Result<Series> {
        if periods == 0 || self.is_empty() {
            return Ok(self.clone());
        }
        let len = self.len() as i64;
        let periods = periods.clamp(-len, len);
        let positions: Vec<Option<usize>> = (0..len)
            .map(|pos| {
                let source = pos - periods;
                (0..len).contains(&source).then_some(source as usize)
            })
            .collect();
        let values = if self.can_hold_missing() {
            self.values.gather(&positions)?
        } else {
            self.values.astype(Kind::Float)?.gather(&positions)?
        };
        self.derive(values)
    }

    /// Moves the labels by `offset` and keeps the values in place.
    pub fn shift_labels(&self, offset: LabelOffset) -> Result<Series> {
        self.derive_with_index(self.values.clone(), self.index.shift(offset)?)
    }
}
