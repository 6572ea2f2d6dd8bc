// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::error::{Result, SeriesError};
use crate::scalar::Kind;

/// Which operand of an aligned pair is missing at one position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingSide {
    Neither,
    Left,
    Right,
    Both,
}

impl MissingSide {
    pub const fn from_flags(left_missing: bool, right_missing: bool) -> Self {
        match (left_missing, right_missing) {
            (false, false) => Self::Neither,
            (true, false) => Self::Left,
            (false, true) => Self::Right,
            (true, true) => Self::Both,
        }
    }

    /// Exactly one side missing; the only case a fill value is substituted.
    pub const fn is_exclusive(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neither => "Neither",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Both => "Both",
        }
    }
}

/// What to do with missing elements when mapping a function over values.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NaAction {
    /// Missing elements are passed to the function like any other value.
    #[default]
    Apply,
    /// Missing elements skip the function and stay missing.
    Ignore,
}

/// Lightweight missing-data diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct MissingStats {
    pub missing_count: usize,
    pub missing_fraction: f64,
    pub valid_count: usize,
}

/// Per-position [`MissingSide`] for two aligned masks of equal length.
pub fn missing_sides(left: &[bool], right: &[bool]) -> Result<Vec<MissingSide>> {
    if left.len() != right.len() {
        return Err(SeriesError::shape_mismatch(left.len(), right.len()));
    }
    Ok(left
        .iter()
        .zip(right)
        .map(|(&l, &r)| MissingSide::from_flags(l, r))
        .collect())
}

/// Computes missing-data statistics; `missing_count` is clamped to `total`.
pub fn compute_missing_stats(total: usize, missing_count: usize) -> MissingStats {
    let bounded = missing_count.min(total);
    let missing_fraction = if total == 0 {
        0.0
    } else {
        bounded as f64 / total as f64
    };
    MissingStats {
        missing_count: bounded,
        missing_fraction,
        valid_count: total - bounded,
    }
}

/// Fails when `missing_needed` slots must be written into a buffer of `kind`
/// that has no sentinel.
pub fn check_missing_representable(kind: Kind, missing_needed: usize, context: &str) -> Result<()> {
    if missing_needed > 0 && !kind.can_hold_missing() {
        return Err(SeriesError::unrepresentable_missing(format!(
            "{context} needs {missing_needed} missing slot(s) but kind={kind} has no sentinel; cast to float first"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        MissingSide, check_missing_representable, compute_missing_stats, missing_sides,
    };
    use crate::scalar::Kind;

    #[test]
    fn sides_classify_every_flag_pair() {
        let sides = missing_sides(&[false, true, false, true], &[false, false, true, true])
            .expect("equal lengths");
        assert_eq!(
            sides,
            vec![
                MissingSide::Neither,
                MissingSide::Left,
                MissingSide::Right,
                MissingSide::Both
            ]
        );
        let exclusive: Vec<bool> = sides.iter().map(|s| s.is_exclusive()).collect();
        assert_eq!(exclusive, vec![false, true, true, false]);
    }

    #[test]
    fn sides_reject_mismatched_masks() {
        let err = missing_sides(&[true], &[true, false]).expect_err("lengths differ");
        assert!(err.to_string().contains("expected length 1, got 2"));
    }

    #[test]
    fn stats_use_fraction_and_clamp_missing() {
        let stats = compute_missing_stats(8, 3);
        assert!((stats.missing_fraction - 0.375).abs() < f64::EPSILON);
        assert_eq!(stats.valid_count, 5);

        let zero = compute_missing_stats(0, 5);
        assert_eq!(zero.missing_fraction, 0.0);
        assert_eq!(zero.valid_count, 0);
    }

    #[test]
    fn int_kind_rejects_missing_slots_with_context() {
        assert!(check_missing_representable(Kind::Int, 0, "reindex").is_ok());
        assert!(check_missing_representable(Kind::Float, 4, "reindex").is_ok());
        let err = check_missing_representable(Kind::Int, 2, "reindex")
            .expect_err("int cannot hold missing");
        let msg = err.to_string();
        assert!(msg.contains("reindex"));
        assert!(msg.contains("kind=int"));
    }
}
