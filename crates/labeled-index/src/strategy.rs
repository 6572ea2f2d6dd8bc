// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::index::{IndexKind, LabelIndex};
use crate::label::Label;
use chrono::Duration;
use labeled_core::{Result, SeriesError};

/// Offset applied to labels when shifting along the axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelOffset {
    /// Whole steps: `+n` on integer labels, `n` inferred strides on a
    /// regular datetime index.
    Periods(i64),
    Duration(Duration),
}

/// Behaviour that depends on the kind of an index.
///
/// Implemented per [`IndexKind`] and looked up with [`strategy_for`].
pub trait AxisStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-line description used in summaries.
    fn describe(&self, index: &LabelIndex) -> String {
        format!("{} axis: {} label(s)", self.name(), index.len())
    }

    /// Labels moved by `offset`, in the original order.
    fn shift_labels(&self, index: &LabelIndex, _offset: LabelOffset) -> Result<Vec<Label>> {
        Err(SeriesError::not_supported(format!(
            "shifting labels of a {} index",
            index.kind().as_str()
        )))
    }

    /// Numeric position of a label on the axis, used by interpolation.
    fn coordinate(&self, _label: &Label) -> Option<f64> {
        None
    }
}

pub struct IntegerAxis;
pub struct DatetimeAxis;
pub struct GenericAxis;

impl AxisStrategy for IntegerAxis {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn shift_labels(&self, index: &LabelIndex, offset: LabelOffset) -> Result<Vec<Label>> {
        let LabelOffset::Periods(periods) = offset else {
            return Err(SeriesError::not_supported(
                "a duration offset on integer labels",
            ));
        };
        index
            .iter()
            .map(|label| match label {
                Label::Int(v) => v.checked_add(periods).map(Label::Int).ok_or_else(|| {
                    SeriesError::invalid_input(format!("shifting label {v} by {periods} overflows"))
                }),
                other => Err(SeriesError::invalid_index(format!(
                    "non-integer label {other} on an integer axis"
                ))),
            })
            .collect()
    }

    fn coordinate(&self, label: &Label) -> Option<f64> {
        label.as_i64().map(|v| v as f64)
    }
}

impl DatetimeAxis {
    /// The common spacing of a regular index, if there is one.
    fn regular_step(index: &LabelIndex) -> Option<Duration> {
        let stamps: Vec<_> = index.iter().filter_map(Label::as_datetime).collect();
        let step = stamps.get(1).zip(stamps.first()).map(|(b, a)| *b - *a)?;
        let regular = stamps.windows(2).all(|w| w[1] - w[0] == step);
        (regular && step > Duration::zero()).then_some(step)
    }
}

impl AxisStrategy for DatetimeAxis {
    fn name(&self) -> &'static str {
        "datetime"
    }

    fn describe(&self, index: &LabelIndex) -> String {
        match (index.labels().first(), index.labels().last()) {
            (Some(first), Some(last)) => format!(
                "datetime axis: {first} to {last}, {} label(s)",
                index.len()
            ),
            _ => "datetime axis: 0 label(s)".to_owned(),
        }
    }

    fn shift_labels(&self, index: &LabelIndex, offset: LabelOffset) -> Result<Vec<Label>> {
        let delta = match offset {
            LabelOffset::Duration(delta) => delta,
            LabelOffset::Periods(periods) => {
                let step = Self::regular_step(index).ok_or_else(|| {
                    SeriesError::invalid_input(
                        "cannot infer a regular spacing to shift datetime labels by periods",
                    )
                })?;
                i32::try_from(periods)
                    .ok()
                    .and_then(|p| step.checked_mul(p))
                    .ok_or_else(|| {
                        SeriesError::invalid_input(format!("shift of {periods} periods overflows"))
                    })?
            }
        };
        index
            .iter()
            .map(|label| {
                label
                    .as_datetime()
                    .and_then(|dt| dt.checked_add_signed(delta))
                    .map(Label::Datetime)
                    .ok_or_else(|| {
                        SeriesError::invalid_input(format!("cannot shift label {label} by {delta}"))
                    })
            })
            .collect()
    }

    fn coordinate(&self, label: &Label) -> Option<f64> {
        let utc = label.as_datetime()?.and_utc();
        Some(utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) * 1e-9)
    }
}

impl AxisStrategy for GenericAxis {
    fn name(&self) -> &'static str {
        "generic"
    }
}

static INTEGER_AXIS: IntegerAxis = IntegerAxis;
static DATETIME_AXIS: DatetimeAxis = DatetimeAxis;
static GENERIC_AXIS: GenericAxis = GenericAxis;

pub fn strategy_for(kind: IndexKind) -> &'static dyn AxisStrategy {
    match kind {
        IndexKind::Integer => &INTEGER_AXIS,
        IndexKind::Datetime => &DATETIME_AXIS,
        _ => &GENERIC_AXIS,
    }
}

impl LabelIndex {
    pub fn strategy(&self) -> &'static dyn AxisStrategy {
        strategy_for(self.kind())
    }

    /// New index with every label moved by `offset`.
    pub fn shift(&self, offset: LabelOffset) -> Result<LabelIndex> {
        Ok(LabelIndex::new(self.strategy().shift_labels(self, offset)?))
    }
}
