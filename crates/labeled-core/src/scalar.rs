// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt;

/// Declared element kind of a value buffer, fixed at construction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Float,
    Int,
    Bool,
    Datetime,
    Object,
}

impl Kind {
    /// Stable, user-facing name for diagnostics and error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Datetime => "datetime",
            Self::Object => "object",
        }
    }

    /// Plain integers have no sentinel; every other kind can mark "no data".
    pub const fn can_hold_missing(self) -> bool {
        !matches!(self, Self::Int)
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Float | Self::Int)
    }

    /// The sentinel written for absent slots, `None` for `Int`.
    pub fn missing_sentinel(self) -> Option<Scalar> {
        match self {
            Self::Int => None,
            Self::Float => Some(Scalar::Float(f64::NAN)),
            Self::Bool | Self::Datetime | Self::Object => Some(Scalar::Missing),
        }
    }

    /// Kind able to hold every value of `self` plus a missing sentinel.
    pub const fn with_missing(self) -> Self {
        match self {
            Self::Int => Self::Float,
            other => other,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single element of any kind.
///
/// `Missing` is the object-domain sentinel; a `Float(NaN)` is treated as
/// missing as well.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default)]
pub enum Scalar {
    #[default]
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Datetime(NaiveDateTime),
    Str(String),
}

/// Hashable normalization of a [`Scalar`] for set membership and counting.
///
/// Integral floats collapse onto `Int` so that `1` and `1.0` are the same
/// member; every missing representation collapses onto `Missing`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKey {
    Missing,
    Bool(bool),
    Int(i64),
    FloatBits(u64),
    Datetime(NaiveDateTime),
    Str(String),
}

impl Scalar {
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Kind this scalar would infer on its own; `None` for missing.
    pub fn kind_hint(&self) -> Option<Kind> {
        match self {
            Self::Missing => None,
            Self::Bool(_) => Some(Kind::Bool),
            Self::Int(_) => Some(Kind::Int),
            Self::Float(v) if v.is_nan() => None,
            Self::Float(_) => Some(Kind::Float),
            Self::Datetime(_) => Some(Kind::Datetime),
            Self::Str(_) => Some(Kind::Object),
        }
    }

    /// Numeric view; booleans count as `0`/`1`, missing and text yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(f64::from(u8::from(*b))),
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    /// Exact integer view; integral floats convert, fractional ones do not.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.fract() == 0.0 && v.abs() < 9.2e18 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Truthiness used by the logical operator family; missing is false.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Missing => false,
            Self::Bool(b) => *b,
            Self::Int(v) => *v != 0,
            Self::Float(v) => !v.is_nan() && *v != 0.0,
            Self::Datetime(_) => true,
            Self::Str(s) => !s.is_empty(),
        }
    }

    /// Orders two scalars when they are mutually comparable.
    ///
    /// Numbers compare across `Int`/`Float`; text, booleans and datetimes
    /// only compare within their own variant. Missing never compares.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        if self.is_missing() || other.is_missing() {
            return None;
        }
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Datetime(a), Self::Datetime(b)) => Some(a.cmp(b)),
            (Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn key(&self) -> ScalarKey {
        match self {
            _ if self.is_missing() => ScalarKey::Missing,
            Self::Bool(b) => ScalarKey::Bool(*b),
            Self::Int(v) => ScalarKey::Int(*v),
            Self::Float(v) => match self.as_i64() {
                Some(int) => ScalarKey::Int(int),
                None => ScalarKey::FloatBits(v.to_bits()),
            },
            Self::Datetime(dt) => ScalarKey::Datetime(*dt),
            Self::Str(s) => ScalarKey::Str(s.clone()),
            Self::Missing => ScalarKey::Missing,
        }
    }
}

impl PartialEq for Scalar {
    /// Missing equals missing; numbers compare across `Int` and `Float`.
    fn eq(&self, other: &Self) -> bool {
        if self.is_missing() || other.is_missing() {
            return self.is_missing() && other.is_missing();
        }
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Datetime(a), Self::Datetime(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                self.as_f64() == other.as_f64()
            }
            _ => false,
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("NaN"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) if v.is_nan() => f.write_str("NaN"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Datetime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<NaiveDateTime> for Scalar {
    fn from(value: NaiveDateTime) -> Self {
        Self::Datetime(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// Infers the narrowest kind able to hold every scalar.
///
/// Only-missing input infers `Float`; ints mixed with floats or missing
/// values infer `Float`; any other mixture infers `Object`.
pub fn infer_kind(values: &[Scalar]) -> Kind {
    let mut seen: Option<Kind> = None;
    let mut saw_missing = false;
    for value in values {
        let Some(kind) = value.kind_hint() else {
            saw_missing = true;
            continue;
        };
        seen = Some(match (seen, kind) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(Kind::Int | Kind::Float), Kind::Int | Kind::Float) => Kind::Float,
            _ => return Kind::Object,
        });
    }
    match seen {
        None => Kind::Float,
        Some(Kind::Int) if saw_missing => Kind::Float,
        Some(kind) => kind,
    }
}
