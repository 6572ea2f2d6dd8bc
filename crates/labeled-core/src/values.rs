// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::error::{Result, SeriesError};
use crate::missing::check_missing_representable;
use crate::scalar::{Kind, Scalar, infer_kind};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Contiguous, homogeneously-kinded value buffer.
///
/// Missing slots are `NaN` for `Float`, `None` for `Bool` and `Datetime`,
/// and `Scalar::Missing` (or a float `NaN`) for `Object`. `Int` buffers
/// never contain missing values.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub enum Values {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Bool(Vec<Option<bool>>),
    Datetime(Vec<Option<NaiveDateTime>>),
    Object(Vec<Scalar>),
}

fn cast_error(value: &Scalar, kind: Kind) -> SeriesError {
    SeriesError::invalid_input(format!("cannot cast value {value} to kind {kind}"))
}

fn to_f64(value: &Scalar) -> Result<f64> {
    match value {
        _ if value.is_missing() => Ok(f64::NAN),
        Scalar::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| cast_error(value, Kind::Float)),
        other => other.as_f64().ok_or_else(|| cast_error(value, Kind::Float)),
    }
}

fn to_i64(value: &Scalar) -> Result<i64> {
    match value {
        _ if value.is_missing() => Err(SeriesError::unrepresentable_missing(
            "int kind has no missing sentinel; cast to float first",
        )),
        Scalar::Float(v) if v.is_finite() => Ok(v.trunc() as i64),
        Scalar::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| cast_error(value, Kind::Int)),
        Scalar::Datetime(dt) => dt
            .and_utc()
            .timestamp_nanos_opt()
            .ok_or_else(|| cast_error(value, Kind::Int)),
        other => other.as_i64().ok_or_else(|| cast_error(value, Kind::Int)),
    }
}

fn to_bool(value: &Scalar) -> Result<Option<bool>> {
    match value {
        _ if value.is_missing() => Ok(None),
        Scalar::Datetime(_) => Err(cast_error(value, Kind::Bool)),
        other => Ok(Some(other.truthy())),
    }
}

fn to_datetime(value: &Scalar) -> Result<Option<NaiveDateTime>> {
    match value {
        _ if value.is_missing() => Ok(None),
        Scalar::Datetime(dt) => Ok(Some(*dt)),
        Scalar::Int(nanos) => Ok(Some(DateTime::from_timestamp_nanos(*nanos).naive_utc())),
        Scalar::Str(s) => parse_datetime(s)
            .map(Some)
            .ok_or_else(|| cast_error(value, Kind::Datetime)),
        _ => Err(cast_error(value, Kind::Datetime)),
    }
}

/// Parses `YYYY-mm-dd HH:MM:SS`, `YYYY-mm-ddTHH:MM:SS` or `YYYY-mm-dd`.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Whether a buffer of `kind` can store `value` without changing kind.
///
/// Numeric stores are lenient (an integral float fits an int buffer);
/// missing values fit every kind but `Int`.
pub fn accepts(kind: Kind, value: &Scalar) -> bool {
    if value.is_missing() {
        return kind.can_hold_missing();
    }
    match kind {
        Kind::Object => true,
        Kind::Float => matches!(value, Scalar::Int(_) | Scalar::Float(_) | Scalar::Bool(_)),
        Kind::Int => matches!(value, Scalar::Int(_) | Scalar::Bool(_)) || value.as_i64().is_some(),
        Kind::Bool => matches!(value, Scalar::Bool(_)),
        Kind::Datetime => matches!(value, Scalar::Datetime(_)),
    }
}

/// Validates `value` for storage into a `kind` buffer and normalizes it.
pub fn coerce_for_store(kind: Kind, value: &Scalar) -> Result<Scalar> {
    if value.is_missing() && !kind.can_hold_missing() {
        return Err(SeriesError::unrepresentable_missing(format!(
            "cannot store a missing value in a {kind} buffer"
        )));
    }
    if !accepts(kind, value) {
        return Err(SeriesError::invalid_input(format!(
            "cannot store value {value} in a {kind} buffer"
        )));
    }
    Ok(match kind {
        Kind::Float => Scalar::Float(to_f64(value)?),
        Kind::Int => Scalar::Int(to_i64(value)?),
        Kind::Bool | Kind::Datetime | Kind::Object => value.clone(),
    })
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::Datetime(v) => v.len(),
            Self::Object(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Float(_) => Kind::Float,
            Self::Int(_) => Kind::Int,
            Self::Bool(_) => Kind::Bool,
            Self::Datetime(_) => Kind::Datetime,
            Self::Object(_) => Kind::Object,
        }
    }

    pub fn can_hold_missing(&self) -> bool {
        self.kind().can_hold_missing()
    }

    pub fn empty(kind: Kind) -> Self {
        match kind {
            Kind::Float => Self::Float(Vec::new()),
            Kind::Int => Self::Int(Vec::new()),
            Kind::Bool => Self::Bool(Vec::new()),
            Kind::Datetime => Self::Datetime(Vec::new()),
            Kind::Object => Self::Object(Vec::new()),
        }
    }

    pub fn get(&self, pos: usize) -> Option<Scalar> {
        Some(match self {
            Self::Float(v) => Scalar::Float(*v.get(pos)?),
            Self::Int(v) => Scalar::Int(*v.get(pos)?),
            Self::Bool(v) => Scalar::from(*v.get(pos)?),
            Self::Datetime(v) => Scalar::from(*v.get(pos)?),
            Self::Object(v) => v.get(pos)?.clone(),
        })
    }

    pub fn is_missing_at(&self, pos: usize) -> bool {
        match self {
            Self::Float(v) => v.get(pos).is_some_and(|x| x.is_nan()),
            Self::Int(_) => false,
            Self::Bool(v) => v.get(pos).is_some_and(Option::is_none),
            Self::Datetime(v) => v.get(pos).is_some_and(Option::is_none),
            Self::Object(v) => v.get(pos).is_some_and(Scalar::is_missing),
        }
    }

    pub fn missing_mask(&self) -> Vec<bool> {
        (0..self.len()).map(|pos| self.is_missing_at(pos)).collect()
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&pos| self.is_missing_at(pos)).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).filter_map(move |pos| self.get(pos))
    }

    pub fn to_scalars(&self) -> Vec<Scalar> {
        self.iter().collect()
    }

    /// Builds a buffer from scalars, inferring the kind unless one is given.
    ///
    /// An explicit kind casts every element; a failed cast aborts the whole
    /// construction.
    pub fn from_scalars(values: Vec<Scalar>, kind: Option<Kind>) -> Result<Self> {
        let kind = kind.unwrap_or_else(|| infer_kind(&values));
        Ok(match kind {
            Kind::Float => Self::Float(values.iter().map(to_f64).collect::<Result<_>>()?),
            Kind::Int => Self::Int(values.iter().map(to_i64).collect::<Result<_>>()?),
            Kind::Bool => Self::Bool(values.iter().map(to_bool).collect::<Result<_>>()?),
            Kind::Datetime => {
                Self::Datetime(values.iter().map(to_datetime).collect::<Result<_>>()?)
            }
            Kind::Object => Self::Object(values),
        })
    }

    /// Broadcasts one scalar to `len` slots.
    pub fn full(value: &Scalar, len: usize, kind: Option<Kind>) -> Result<Self> {
        Self::from_scalars(vec![value.clone(); len], kind.or_else(|| value.kind_hint()))
    }

    /// A buffer of `len` missing slots; fails for `Int`.
    pub fn missing(kind: Kind, len: usize) -> Result<Self> {
        Ok(match kind {
            Kind::Float => Self::Float(vec![f64::NAN; len]),
            Kind::Bool => Self::Bool(vec![None; len]),
            Kind::Datetime => Self::Datetime(vec![None; len]),
            Kind::Object => Self::Object(vec![Scalar::Missing; len]),
            Kind::Int => {
                return Err(SeriesError::unrepresentable_missing(
                    "cannot allocate missing slots in an int buffer",
                ));
            }
        })
    }

    pub fn astype(&self, kind: Kind) -> Result<Self> {
        match (self, kind) {
            (_, k) if k == self.kind() => Ok(self.clone()),
            (Self::Int(v), Kind::Float) => Ok(Self::Float(v.iter().map(|&x| x as f64).collect())),
            (Self::Float(v), Kind::Int) if v.iter().any(|x| x.is_nan()) => {
                Err(SeriesError::unrepresentable_missing(
                    "cannot cast float buffer with missing values to int",
                ))
            }
            _ => Self::from_scalars(self.to_scalars(), Some(kind)),
        }
    }

    /// Numeric view with missing slots as `NaN`.
    pub fn to_f64(&self) -> Result<Vec<f64>> {
        match self {
            Self::Float(v) => Ok(v.clone()),
            Self::Int(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            Self::Bool(v) => Ok(v
                .iter()
                .map(|b| b.map_or(f64::NAN, |b| f64::from(u8::from(b))))
                .collect()),
            Self::Datetime(_) => Err(SeriesError::not_supported(
                "numeric view of a datetime buffer",
            )),
            Self::Object(v) => v
                .iter()
                .map(|s| {
                    if s.is_missing() {
                        Ok(f64::NAN)
                    } else {
                        s.as_f64().ok_or_else(|| {
                            SeriesError::not_supported(format!(
                                "numeric view of non-numeric object value {s}"
                            ))
                        })
                    }
                })
                .collect(),
        }
    }

    fn check_positions(&self, positions: impl Iterator<Item = usize>) -> Result<()> {
        let len = self.len();
        for pos in positions {
            if pos >= len {
                return Err(SeriesError::index_out_of_range(pos as isize, len));
            }
        }
        Ok(())
    }

    /// Gathers the given positions into a new buffer of the same kind.
    pub fn take(&self, positions: &[usize]) -> Result<Self> {
        self.check_positions(positions.iter().copied())?;
        Ok(match self {
            Self::Float(v) => Self::Float(positions.iter().map(|&p| v[p]).collect()),
            Self::Int(v) => Self::Int(positions.iter().map(|&p| v[p]).collect()),
            Self::Bool(v) => Self::Bool(positions.iter().map(|&p| v[p]).collect()),
            Self::Datetime(v) => Self::Datetime(positions.iter().map(|&p| v[p]).collect()),
            Self::Object(v) => Self::Object(positions.iter().map(|&p| v[p].clone()).collect()),
        })
    }

    /// Gathers through a position map; absent slots receive the kind's
    /// missing sentinel.
    ///
    /// Fails with `UnrepresentableMissing` when an `Int` buffer would need
    /// a missing slot; callers must upcast first.
    pub fn gather(&self, positions: &[Option<usize>]) -> Result<Self> {
        self.check_positions(positions.iter().flatten().copied())?;
        Ok(match self {
            Self::Float(v) => {
                Self::Float(positions.iter().map(|p| p.map_or(f64::NAN, |p| v[p])).collect())
            }
            Self::Int(v) => {
                let holes = positions.iter().filter(|p| p.is_none()).count();
                check_missing_representable(Kind::Int, holes, "gather")?;
                Self::Int(positions.iter().flatten().map(|&p| v[p]).collect())
            }
            Self::Bool(v) => Self::Bool(positions.iter().map(|p| p.and_then(|p| v[p])).collect()),
            Self::Datetime(v) => {
                Self::Datetime(positions.iter().map(|p| p.and_then(|p| v[p])).collect())
            }
            Self::Object(v) => Self::Object(
                positions
                    .iter()
                    .map(|p| p.map_or(Scalar::Missing, |p| v[p].clone()))
                    .collect(),
            ),
        })
    }

    /// Gathers through a position map, writing `fill` into absent slots.
    ///
    /// The result kind widens when `fill` does not fit: an int buffer with a
    /// fractional fill becomes float, any other mismatch becomes object.
    pub fn gather_or(&self, positions: &[Option<usize>], fill: &Scalar) -> Result<Self> {
        if fill.is_missing() {
            return self.gather(positions);
        }
        if positions.iter().all(Option::is_some) {
            let dense: Vec<usize> = positions.iter().flatten().copied().collect();
            return self.take(&dense);
        }
        self.check_positions(positions.iter().flatten().copied())?;
        let kind = if accepts(self.kind(), fill) {
            self.kind()
        } else if self.kind().is_numeric() && fill.as_f64().is_some() {
            Kind::Float
        } else {
            Kind::Object
        };
        let scalars = positions
            .iter()
            .map(|p| match p {
                Some(p) => self.get(*p).unwrap_or_default(),
                None => fill.clone(),
            })
            .collect();
        Self::from_scalars(scalars, Some(kind))
    }

    fn store(&mut self, pos: usize, value: Scalar) {
        match self {
            Self::Float(v) => v[pos] = value.as_f64().unwrap_or(f64::NAN),
            Self::Int(v) => {
                if let Some(x) = value.as_i64() {
                    v[pos] = x;
                }
            }
            Self::Bool(v) => {
                v[pos] = match value {
                    Scalar::Bool(b) => Some(b),
                    _ => None,
                }
            }
            Self::Datetime(v) => {
                v[pos] = match value {
                    Scalar::Datetime(dt) => Some(dt),
                    _ => None,
                }
            }
            Self::Object(v) => v[pos] = value,
        }
    }

    /// Writes one value in place, validating before any mutation.
    pub fn set(&mut self, pos: usize, value: &Scalar) -> Result<()> {
        self.check_positions(std::iter::once(pos))?;
        let coerced = coerce_for_store(self.kind(), value)?;
        self.store(pos, coerced);
        Ok(())
    }

    /// Writes many values in place; either every write happens or none.
    pub fn set_many(&mut self, positions: &[usize], values: &[Scalar]) -> Result<()> {
        if positions.len() != values.len() {
            return Err(SeriesError::shape_mismatch(positions.len(), values.len()));
        }
        self.check_positions(positions.iter().copied())?;
        let kind = self.kind();
        let coerced = values
            .iter()
            .map(|v| coerce_for_store(kind, v))
            .collect::<Result<Vec<_>>>()?;
        for (&pos, value) in positions.iter().zip(coerced) {
            self.store(pos, value);
        }
        Ok(())
    }

    /// Copies the half-open range `[start, end)`, clamped to the buffer.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.len());
        let start = start.min(end);
        match self {
            Self::Float(v) => Self::Float(v[start..end].to_vec()),
            Self::Int(v) => Self::Int(v[start..end].to_vec()),
            Self::Bool(v) => Self::Bool(v[start..end].to_vec()),
            Self::Datetime(v) => Self::Datetime(v[start..end].to_vec()),
            Self::Object(v) => Self::Object(v[start..end].to_vec()),
        }
    }

    /// Concatenates buffers, widening to float for int/float mixes and to
    /// object for any other mix.
    pub fn concat(parts: &[&Values]) -> Result<Self> {
        let Some(first) = parts.first() else {
            return Ok(Self::empty(Kind::Float));
        };
        let kind = parts.iter().skip(1).fold(first.kind(), |acc, part| {
            match (acc, part.kind()) {
                (a, b) if a == b => a,
                (Kind::Int | Kind::Float, Kind::Int | Kind::Float) => Kind::Float,
                _ => Kind::Object,
            }
        });
        let scalars: Vec<Scalar> = parts.iter().flat_map(|part| part.iter()).collect();
        Self::from_scalars(scalars, Some(kind))
    }

    /// Elementwise equality where missing equals missing.
    pub fn equals(&self, other: &Values) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl PartialEq for Values {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<Vec<f64>> for Values {
    fn from(values: Vec<f64>) -> Self {
        Self::Float(values)
    }
}

impl From<Vec<i64>> for Values {
    fn from(values: Vec<i64>) -> Self {
        Self::Int(values)
    }
}

impl From<Vec<bool>> for Values {
    fn from(values: Vec<bool>) -> Self {
        Self::Bool(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<bool>>> for Values {
    fn from(values: Vec<Option<bool>>) -> Self {
        Self::Bool(values)
    }
}

impl From<Vec<NaiveDateTime>> for Values {
    fn from(values: Vec<NaiveDateTime>) -> Self {
        Self::Datetime(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<&str>> for Values {
    fn from(values: Vec<&str>) -> Self {
        Self::Object(values.into_iter().map(Scalar::from).collect())
    }
}

impl From<Vec<String>> for Values {
    fn from(values: Vec<String>) -> Self {
        Self::Object(values.into_iter().map(Scalar::Str).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{Values, accepts, coerce_for_store, parse_datetime};
    use crate::error::SeriesError;
    use crate::scalar::{Kind, Scalar};

    #[test]
    fn from_scalars_infers_and_casts() {
        let inferred = Values::from_scalars(vec![Scalar::Int(1), Scalar::Missing], None)
            .expect("int+missing infers float");
        assert_eq!(inferred.kind(), Kind::Float);
        assert!(inferred.is_missing_at(1));

        let cast = Values::from_scalars(vec![Scalar::from("2"), Scalar::Float(3.9)], Some(Kind::Int))
            .expect("text and float cast to int");
        assert!(cast.equals(&Values::Int(vec![2, 3])));

        let err = Values::from_scalars(vec![Scalar::from("x")], Some(Kind::Float))
            .expect_err("text is not a float");
        assert!(matches!(err, SeriesError::InvalidInput(_)));

        let err = Values::from_scalars(vec![Scalar::Missing], Some(Kind::Int))
            .expect_err("missing cannot be int");
        assert!(matches!(err, SeriesError::UnrepresentableMissing(_)));
    }

    #[test]
    fn equality_treats_missing_slots_as_equal() {
        assert_eq!(Values::Float(vec![1.0, f64::NAN]), Values::Float(vec![1.0, f64::NAN]));
        assert_ne!(Values::Float(vec![1.0]), Values::Float(vec![2.0]));
        assert_ne!(Values::Int(vec![1]), Values::Int(vec![1, 2]));
    }

    #[test]
    fn gather_writes_sentinels_and_rejects_int_holes() {
        let floats = Values::Float(vec![1.0, 2.0]);
        let gathered = floats.gather(&[Some(1), None, Some(0)]).expect("float gather");
        assert_eq!(gathered.get(0), Some(Scalar::Float(2.0)));
        assert!(gathered.is_missing_at(1));

        let ints = Values::Int(vec![1, 2]);
        let dense = ints.gather(&[Some(1), Some(0)]).expect("dense int gather");
        assert!(dense.equals(&Values::Int(vec![2, 1])));
        let err = ints.gather(&[Some(0), None]).expect_err("int hole must fail");
        assert!(matches!(err, SeriesError::UnrepresentableMissing(_)));

        let err = floats.gather(&[Some(5)]).expect_err("out of range");
        assert!(matches!(err, SeriesError::IndexOutOfRange { .. }));
    }

    #[test]
    fn gather_or_widens_kind_for_foreign_fill() {
        let ints = Values::Int(vec![1, 2]);
        let same = ints.gather_or(&[Some(0), None], &Scalar::Int(0)).expect("int fill");
        assert!(same.equals(&Values::Int(vec![1, 0])));

        let widened = ints.gather_or(&[Some(0), None], &Scalar::Float(0.5)).expect("float fill");
        assert_eq!(widened.kind(), Kind::Float);

        let object = ints.gather_or(&[None, Some(1)], &Scalar::from("n/a")).expect("text fill");
        assert_eq!(object.kind(), Kind::Object);
        assert_eq!(object.get(0), Some(Scalar::from("n/a")));
    }

    #[test]
    fn set_many_validates_before_writing() {
        let mut values = Values::Int(vec![1, 2, 3]);
        let err = values
            .set_many(&[0, 1], &[Scalar::Int(10), Scalar::Missing])
            .expect_err("missing into int must fail");
        assert!(matches!(err, SeriesError::UnrepresentableMissing(_)));
        assert!(values.equals(&Values::Int(vec![1, 2, 3])));

        values
            .set_many(&[0, 2], &[Scalar::Int(10), Scalar::Float(30.0)])
            .expect("valid writes");
        assert!(values.equals(&Values::Int(vec![10, 2, 30])));

        let err = values.set(3, &Scalar::Int(0)).expect_err("position 3 out of range");
        assert!(matches!(err, SeriesError::IndexOutOfRange { .. }));
    }

    #[test]
    fn store_rules_are_lenient_for_numbers_only() {
        assert!(accepts(Kind::Float, &Scalar::Int(1)));
        assert!(accepts(Kind::Int, &Scalar::Float(2.0)));
        assert!(!accepts(Kind::Int, &Scalar::Float(2.5)));
        assert!(!accepts(Kind::Float, &Scalar::from("1")));
        assert!(accepts(Kind::Object, &Scalar::from("1")));
        assert!(coerce_for_store(Kind::Bool, &Scalar::Int(1)).is_err());
    }

    #[test]
    fn concat_widens_mixed_kinds() {
        let a = Values::Int(vec![1]);
        let b = Values::Float(vec![2.5]);
        let c = Values::from(vec!["x"]);
        assert_eq!(Values::concat(&[&a, &b]).expect("concat").kind(), Kind::Float);
        assert_eq!(Values::concat(&[&a, &c]).expect("concat").kind(), Kind::Object);
        assert_eq!(Values::concat(&[&a, &a]).expect("concat").kind(), Kind::Int);
    }

    #[test]
    fn datetime_text_parses_in_common_layouts() {
        assert!(parse_datetime("2012-01-02").is_some());
        assert!(parse_datetime("2012-01-02 03:04:05").is_some());
        assert!(parse_datetime("2012-01-02T03:04:05").is_some());
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn numeric_view_marks_missing_as_nan() {
        let values = Values::Bool(vec![Some(true), None]);
        let view = values.to_f64().expect("bool numeric view");
        assert_eq!(view[0], 1.0);
        assert!(view[1].is_nan());

        let text = Values::from(vec!["a"]);
        assert!(text.to_f64().is_err());
    }
}
