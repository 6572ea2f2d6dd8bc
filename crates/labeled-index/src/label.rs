// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use chrono::NaiveDateTime;
use labeled_core::{Result, Scalar, SeriesError};
use std::fmt;

/// A hashable, totally ordered row key.
///
/// Labels of different variants order by variant (`Bool < Int < Datetime <
/// Str < Tuple`), which keeps joins over mixed indexes deterministic.
/// `Tuple` holds one component per level of a hierarchical index.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Bool(bool),
    Int(i64),
    Datetime(NaiveDateTime),
    Str(String),
    Tuple(Vec<Label>),
}

impl Label {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Datetime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Number of components: the tuple length, or `1` for a flat label.
    pub fn depth(&self) -> usize {
        match self {
            Self::Tuple(parts) => parts.len(),
            _ => 1,
        }
    }

    /// Component at `level`; a flat label is its own level `0`.
    pub fn component(&self, level: usize) -> Option<&Label> {
        match self {
            Self::Tuple(parts) => parts.get(level),
            flat if level == 0 => Some(flat),
            _ => None,
        }
    }

    /// Converts a scalar key into a label.
    ///
    /// Integral floats become `Int`; fractional floats and missing values
    /// cannot label a row.
    pub fn from_scalar(value: &Scalar) -> Result<Self> {
        match value {
            Scalar::Bool(b) => Ok(Self::Bool(*b)),
            Scalar::Int(v) => Ok(Self::Int(*v)),
            Scalar::Datetime(dt) => Ok(Self::Datetime(*dt)),
            Scalar::Str(s) => Ok(Self::Str(s.clone())),
            Scalar::Float(_) if !value.is_missing() => value
                .as_i64()
                .map(Self::Int)
                .ok_or_else(|| SeriesError::not_supported(format!("float label {value}"))),
            _ => Err(SeriesError::invalid_index("a missing value cannot be a label")),
        }
    }

    /// Scalar view of a flat label; tuples render as text.
    pub fn to_scalar(&self) -> Scalar {
        match self {
            Self::Bool(b) => Scalar::Bool(*b),
            Self::Int(v) => Scalar::Int(*v),
            Self::Datetime(dt) => Scalar::Datetime(*dt),
            Self::Str(s) => Scalar::Str(s.clone()),
            Self::Tuple(_) => Scalar::Str(self.to_string()),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Datetime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Self::Str(s) => f.write_str(s),
            Self::Tuple(parts) => {
                f.write_str("(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{part}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Label {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for Label {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<bool> for Label {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<NaiveDateTime> for Label {
    fn from(value: NaiveDateTime) -> Self {
        Self::Datetime(value)
    }
}

impl From<Vec<Label>> for Label {
    fn from(value: Vec<Label>) -> Self {
        Self::Tuple(value)
    }
}

impl<A: Into<Label>, B: Into<Label>> From<(A, B)> for Label {
    fn from((a, b): (A, B)) -> Self {
        Self::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Label>, B: Into<Label>, C: Into<Label>> From<(A, B, C)> for Label {
    fn from((a, b, c): (A, B, C)) -> Self {
        Self::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::Label;
    use labeled_core::{Scalar, SeriesError};

    #[test]
    fn labels_order_by_variant_then_value() {
        let mut labels = vec![
            Label::from("b"),
            Label::from(2),
            Label::from(("a", 1)),
            Label::from("a"),
            Label::from(true),
            Label::from(1),
        ];
        labels.sort();
        assert_eq!(
            labels,
            vec![
                Label::from(true),
                Label::from(1),
                Label::from(2),
                Label::from("a"),
                Label::from("b"),
                Label::from(("a", 1)),
            ]
        );
    }

    #[test]
    fn tuple_components_and_display() {
        let label = Label::from(("bar", 2));
        assert_eq!(label.depth(), 2);
        assert_eq!(label.component(1), Some(&Label::from(2)));
        assert_eq!(label.component(2), None);
        assert_eq!(label.to_string(), "(bar, 2)");
        assert_eq!(Label::from("x").component(0), Some(&Label::from("x")));
    }

    #[test]
    fn scalar_conversion_rejects_missing_and_fractional_floats() {
        assert_eq!(Label::from_scalar(&Scalar::Float(3.0)).expect("integral"), Label::Int(3));
        let err = Label::from_scalar(&Scalar::Float(0.5)).expect_err("fractional float");
        assert!(matches!(err, SeriesError::NotSupported(_)));
        let err = Label::from_scalar(&Scalar::Missing).expect_err("missing");
        assert!(matches!(err, SeriesError::InvalidIndex(_)));
        assert_eq!(Label::from("q").to_scalar(), Scalar::from("q"));
    }
}
