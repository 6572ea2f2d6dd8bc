// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::fill::fill_positions;
use crate::series::{Series, joined_name};
use labeled_core::missing::{MissingSide, missing_sides};
use labeled_core::{ArithOp, CmpOp, Kind, LogicalOp, Result, Scalar, ScalarKey, SeriesError, Values};
use labeled_index::JoinHow;
use std::collections::HashSet;
use std::sync::Arc;

/// Two-dimensional collaborator an array can be combined with.
///
/// Arrays never handle such operands themselves; they answer
/// [`OpOutcome::NotImplemented`] so the table can apply its reflected
/// operator.
pub trait TableLike {
    fn shape(&self) -> (usize, usize);
}

/// Right-hand side of a binary operator.
#[derive(Clone, Copy)]
pub enum Operand<'a> {
    Series(&'a Series),
    Scalar(&'a Scalar),
    Table(&'a dyn TableLike),
}

impl<'a> From<&'a Series> for Operand<'a> {
    fn from(series: &'a Series) -> Self {
        Self::Series(series)
    }
}

impl<'a> From<&'a Scalar> for Operand<'a> {
    fn from(value: &'a Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl<'a> From<&'a dyn TableLike> for Operand<'a> {
    fn from(table: &'a dyn TableLike) -> Self {
        Self::Table(table)
    }
}

/// Outcome of a binary operator.
#[derive(Clone, Debug, PartialEq)]
pub enum OpOutcome {
    Value(Series),
    /// The operand type is handled by the other side's reflected operator.
    NotImplemented,
}

impl OpOutcome {
    pub fn into_result(self, op: BinaryOp) -> Result<Series> {
        match self {
            Self::Value(series) => Ok(series),
            Self::NotImplemented => Err(SeriesError::not_supported(format!(
                "{} between an array and a table",
                op.as_str()
            ))),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Arith(ArithOp),
    Cmp(CmpOp),
    Logical(LogicalOp),
}

/// Elementwise loop chosen for a pair of buffer kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Kernel {
    NativeFloat,
    NativeInt,
    NativeBool,
    NativeDatetime,
    MaskedObject,
    Unsupported,
}

const fn is_numeric_like(kind: Kind) -> bool {
    matches!(kind, Kind::Float | Kind::Int | Kind::Bool)
}

impl BinaryOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arith(op) => op.as_str(),
            Self::Cmp(op) => op.as_str(),
            Self::Logical(op) => op.as_str(),
        }
    }

    /// Dispatch table keyed by (left kind, right kind).
    pub(crate) fn kernel(self, left: Kind, right: Kind) -> Kernel {
        match self {
            Self::Arith(op) => match (left, right) {
                (Kind::Datetime, _) | (_, Kind::Datetime) => Kernel::Unsupported,
                (Kind::Int, Kind::Int) if op == ArithOp::Div => Kernel::NativeFloat,
                (Kind::Int, Kind::Int) => Kernel::NativeInt,
                (Kind::Float, Kind::Float | Kind::Int) | (Kind::Int, Kind::Float) => {
                    Kernel::NativeFloat
                }
                _ => Kernel::MaskedObject,
            },
            Self::Cmp(_) => match (left, right) {
                (l, r) if is_numeric_like(l) && is_numeric_like(r) => Kernel::NativeFloat,
                (Kind::Datetime, Kind::Datetime) => Kernel::NativeDatetime,
                _ => Kernel::MaskedObject,
            },
            Self::Logical(_) => match (left, right) {
                (Kind::Int, Kind::Int) => Kernel::NativeInt,
                (Kind::Bool, Kind::Bool) => Kernel::NativeBool,
                _ => Kernel::MaskedObject,
            },
        }
    }

    /// Applies the operator to two equal-length buffers.
    pub(crate) fn apply_values(self, left: &Values, right: &Values) -> Result<Values> {
        if left.len() != right.len() {
            return Err(SeriesError::shape_mismatch(left.len(), right.len()));
        }
        let kernel = self.kernel(left.kind(), right.kind());
        tracing::trace!(op = self.as_str(), kernel = ?kernel, len = left.len(), "kernel dispatch");
        match (self, kernel) {
            (_, Kernel::Unsupported) => Err(SeriesError::not_supported(format!(
                "{} between {} and {} values",
                self.as_str(),
                left.kind(),
                right.kind()
            ))),
            (Self::Arith(op), Kernel::NativeInt) => match (left, right) {
                (Values::Int(l), Values::Int(r)) => {
                    let native: Result<Vec<i64>> =
                        l.iter().zip(r).map(|(&a, &b)| op.apply_i64(a, b)).collect();
                    match native {
                        Ok(out) => Ok(Values::Int(out)),
                        Err(err) => {
                            tracing::debug!(op = op.as_str(), %err, "int kernel failed; using float kernel");
                            arith_float(op, left, right)
                        }
                    }
                }
                _ => arith_masked(op, left, right),
            },
            (Self::Arith(op), Kernel::NativeFloat) => arith_float(op, left, right),
            (Self::Arith(op), _) => arith_masked(op, left, right),
            (Self::Cmp(op), Kernel::NativeFloat) => {
                let (l, r) = (left.to_f64()?, right.to_f64()?);
                Ok(Values::from(
                    l.iter().zip(&r).map(|(&a, &b)| op.apply_f64(a, b)).collect::<Vec<bool>>(),
                ))
            }
            (Self::Cmp(op), Kernel::NativeDatetime) => match (left, right) {
                (Values::Datetime(l), Values::Datetime(r)) => Ok(Values::from(
                    l.iter()
                        .zip(r)
                        .map(|(a, b)| match (a, b) {
                            (Some(a), Some(b)) => op.eval(Some(a.cmp(b))),
                            _ => op.eval(None),
                        })
                        .collect::<Vec<bool>>(),
                )),
                _ => Ok(cmp_masked(op, left, right)),
            },
            (Self::Cmp(op), _) => Ok(cmp_masked(op, left, right)),
            (Self::Logical(op), Kernel::NativeInt) => match (left, right) {
                (Values::Int(l), Values::Int(r)) => Ok(Values::Int(
                    l.iter().zip(r).map(|(&a, &b)| op.apply_i64(a, b)).collect(),
                )),
                _ => Ok(logical_masked(op, left, right)),
            },
            (Self::Logical(op), Kernel::NativeBool) => match (left, right) {
                (Values::Bool(l), Values::Bool(r)) => Ok(Values::from(
                    l.iter()
                        .zip(r)
                        .map(|(a, b)| op.apply_bool(a.unwrap_or(false), b.unwrap_or(false)))
                        .collect::<Vec<bool>>(),
                )),
                _ => Ok(logical_masked(op, left, right)),
            },
            (Self::Logical(op), _) => Ok(logical_masked(op, left, right)),
        }
    }
}

fn arith_float(op: ArithOp, left: &Values, right: &Values) -> Result<Values> {
    let (l, r) = (left.to_f64()?, right.to_f64()?);
    Ok(Values::Float(
        l.iter().zip(&r).map(|(&a, &b)| op.apply_f64(a, b)).collect(),
    ))
}

/// Computes only where both operands are present; elements the operator
/// is undefined for become missing instead of failing the whole call.
fn arith_masked(op: ArithOp, left: &Values, right: &Values) -> Result<Values> {
    let mut degraded = 0usize;
    let out: Vec<Scalar> = left
        .iter()
        .zip(right.iter())
        .map(|(a, b)| {
            if a.is_missing() || b.is_missing() {
                return Scalar::Missing;
            }
            op.apply_scalar(&a, &b).unwrap_or_else(|| {
                degraded += 1;
                Scalar::Missing
            })
        })
        .collect();
    if degraded > 0 {
        tracing::debug!(op = op.as_str(), degraded, "masked loop left elements missing");
    }
    Values::from_scalars(out, None)
}

fn cmp_masked(op: CmpOp, left: &Values, right: &Values) -> Values {
    Values::from(
        left.iter()
            .zip(right.iter())
            .map(|(a, b)| op.apply_scalar(&a, &b))
            .collect::<Vec<bool>>(),
    )
}

fn logical_masked(op: LogicalOp, left: &Values, right: &Values) -> Values {
    Values::from(
        left.iter()
            .zip(right.iter())
            .map(|(a, b)| op.apply_scalar(&a, &b))
            .collect::<Vec<bool>>(),
    )
}

/// Missing flag for every slot of a joined position map.
fn side_mask(values: &Values, positions: &[Option<usize>]) -> Vec<bool> {
    positions
        .iter()
        .map(|pos| pos.is_none_or(|p| values.is_missing_at(p)))
        .collect()
}

impl Series {
    /// Applies `op` against another array (after an outer alignment), a
    /// broadcast scalar, or a table (which is declined).
    pub fn binary(&self, op: BinaryOp, other: Operand<'_>) -> Result<OpOutcome> {
        match other {
            Operand::Table(table) => {
                tracing::debug!(op = op.as_str(), shape = ?table.shape(), "declined table operand");
                Ok(OpOutcome::NotImplemented)
            }
            Operand::Scalar(value) => {
                let right = Values::full(value, self.len(), None)?;
                let out = op.apply_values(&self.values, &right)?;
                self.derive(out).map(OpOutcome::Value)
            }
            Operand::Series(other) => {
                let aligned = self.align_values(other, JoinHow::Outer, None)?;
                let out = op.apply_values(&aligned.left, &aligned.right)?;
                Series::from_parts(out, aligned.index, joined_name(&self.name, &other.name))
                    .map(OpOutcome::Value)
            }
        }
    }

    fn binary_value<'a>(&self, op: BinaryOp, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary(op, other.into())?.into_result(op)
    }

    /// `value op self` for a scalar on the left.
    pub fn arith_reflected(&self, op: ArithOp, value: &Scalar) -> Result<Series> {
        let left = Values::full(value, self.len(), None)?;
        self.derive(BinaryOp::Arith(op).apply_values(&left, &self.values)?)
    }

    /// Outer-aligned binary operation with a fill for one-sided gaps.
    ///
    /// Where exactly one side is missing (absent label or missing value)
    /// that side takes `fill_value` before the operator runs; positions
    /// missing on both sides stay missing.
    pub fn binop(&self, other: &Series, op: BinaryOp, fill_value: Option<&Scalar>) -> Result<Series> {
        let Some(fill) = fill_value.filter(|fill| !fill.is_missing()) else {
            return self.binary_value(op, other);
        };
        let (index, left_pos, right_pos) =
            if Arc::ptr_eq(&self.index, &other.index) || self.index.equals(&other.index) {
                let identity: Vec<Option<usize>> = (0..self.len()).map(Some).collect();
                (Arc::clone(&self.index), identity.clone(), identity)
            } else {
                let joined = self.index.join(&other.index, JoinHow::Outer);
                (Arc::new(joined.index), joined.left, joined.right)
            };
        let sides = missing_sides(
            &side_mask(&self.values, &left_pos),
            &side_mask(&other.values, &right_pos),
        )?;
        let where_side = |side: MissingSide| -> Vec<usize> {
            sides
                .iter()
                .enumerate()
                .filter(|(_, s)| **s == side)
                .map(|(pos, _)| pos)
                .collect()
        };
        let left = fill_positions(&self.values.gather_or(&left_pos, fill)?, &where_side(MissingSide::Left), fill)?;
        let right = fill_positions(
            &other.values.gather_or(&right_pos, fill)?,
            &where_side(MissingSide::Right),
            fill,
        )?;
        let both = where_side(MissingSide::Both);
        tracing::debug!(
            op = op.as_str(),
            exclusive = sides.iter().filter(|s| s.is_exclusive()).count(),
            both = both.len(),
            "binop with fill"
        );
        let out = fill_positions(&op.apply_values(&left, &right)?, &both, &Scalar::Missing)?;
        Series::from_parts(out, index, joined_name(&self.name, &other.name))
    }

    pub fn add<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Arith(ArithOp::Add), other)
    }

    pub fn sub<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Arith(ArithOp::Sub), other)
    }

    pub fn mul<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Arith(ArithOp::Mul), other)
    }

    pub fn div<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Arith(ArithOp::Div), other)
    }

    pub fn floordiv<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Arith(ArithOp::FloorDiv), other)
    }

    pub fn pow<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Arith(ArithOp::Pow), other)
    }

    pub fn gt<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Cmp(CmpOp::Gt), other)
    }

    pub fn ge<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Cmp(CmpOp::Ge), other)
    }

    pub fn lt<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Cmp(CmpOp::Lt), other)
    }

    pub fn le<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Cmp(CmpOp::Le), other)
    }

    pub fn cmp_eq<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Cmp(CmpOp::Eq), other)
    }

    pub fn cmp_ne<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Cmp(CmpOp::Ne), other)
    }

    pub fn and<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Logical(LogicalOp::And), other)
    }

    pub fn or<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Logical(LogicalOp::Or), other)
    }

    pub fn xor<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Series> {
        self.binary_value(BinaryOp::Logical(LogicalOp::Xor), other)
    }

    /// Arithmetic negation; text and datetimes are rejected.
    pub fn negate(&self) -> Result<Series> {
        let values = match &self.values {
            Values::Float(v) => Values::Float(v.iter().map(|x| -x).collect()),
            Values::Int(v) => Values::Int(v.iter().map(|x| x.wrapping_neg()).collect()),
            Values::Object(v) if v.iter().all(|s| s.is_missing() || s.as_f64().is_some()) => {
                Values::Float(self.values.to_f64()?.iter().map(|x| -x).collect())
            }
            other => {
                return Err(SeriesError::not_supported(format!(
                    "negating {} values",
                    other.kind()
                )));
            }
        };
        self.derive(values)
    }

    /// Membership of every element in `candidates`; `1` and `1.0` match.
    pub fn isin(&self, candidates: &[Scalar]) -> Series {
        let keys: HashSet<ScalarKey> = candidates.iter().map(Scalar::key).collect();
        let mask: Vec<bool> = self.values.iter().map(|v| keys.contains(&v.key())).collect();
        Series {
            values: Values::from(mask),
            index: self.index_arc(),
            name: self.name.clone(),
        }
    }

    /// `lower <= value <= upper`; missing elements are false.
    pub fn between(&self, lower: &Scalar, upper: &Scalar) -> Series {
        let mask: Vec<bool> = self
            .values
            .iter()
            .map(|v| CmpOp::Ge.apply_scalar(&v, lower) && CmpOp::Le.apply_scalar(&v, upper))
            .collect();
        Series {
            values: Values::from(mask),
            index: self.index_arc(),
            name: self.name.clone(),
        }
    }
}

macro_rules! series_binary_trait {
    ($trait:ident, $method:ident, $op:expr) => {
        impl std::ops::$trait<&Series> for &Series {
            type Output = Result<Series>;

            fn $method(self, rhs: &Series) -> Result<Series> {
                self.binary_value($op, rhs)
            }
        }

        impl std::ops::$trait<f64> for &Series {
            type Output = Result<Series>;

            fn $method(self, rhs: f64) -> Result<Series> {
                self.binary_value($op, &Scalar::Float(rhs))
            }
        }
    };
}

series_binary_trait!(Add, add, BinaryOp::Arith(ArithOp::Add));
series_binary_trait!(Sub, sub, BinaryOp::Arith(ArithOp::Sub));
series_binary_trait!(Mul, mul, BinaryOp::Arith(ArithOp::Mul));
series_binary_trait!(Div, div, BinaryOp::Arith(ArithOp::Div));

macro_rules! series_logical_trait {
    ($trait:ident, $method:ident, $op:expr) => {
        impl std::ops::$trait<&Series> for &Series {
            type Output = Result<Series>;

            fn $method(self, rhs: &Series) -> Result<Series> {
                self.binary_value($op, rhs)
            }
        }
    };
}

series_logical_trait!(BitAnd, bitand, BinaryOp::Logical(LogicalOp::And));
series_logical_trait!(BitOr, bitor, BinaryOp::Logical(LogicalOp::Or));
series_logical_trait!(BitXor, bitxor, BinaryOp::Logical(LogicalOp::Xor));

impl std::ops::Neg for &Series {
    type Output = Result<Series>;

    fn neg(self) -> Result<Series> {
        self.negate()
    }
}

#[cfg(test)]
mod tests {
    use super::{BinaryOp, Kernel, OpOutcome, Operand, TableLike};
    use crate::series::Series;
    use labeled_core::{ArithOp, CmpOp, Kind, LogicalOp, Scalar, SeriesError, Values};
    use labeled_index::{Label, LabelIndex};

    struct Table;

    impl TableLike for Table {
        fn shape(&self) -> (usize, usize) {
            (2, 2)
        }
    }

    fn lettered(values: impl Into<Values>, labels: &[&str]) -> Series {
        let index: LabelIndex = labels.iter().map(|s| Label::from(*s)).collect();
        Series::with_index(values, index).expect("labeled")
    }

    fn bools(s: &Series) -> Vec<Scalar> {
        s.values().to_scalars()
    }

    #[test]
    fn dispatch_table_follows_kind_pairs() {
        let add = BinaryOp::Arith(ArithOp::Add);
        assert_eq!(add.kernel(Kind::Int, Kind::Int), Kernel::NativeInt);
        assert_eq!(
            BinaryOp::Arith(ArithOp::Div).kernel(Kind::Int, Kind::Int),
            Kernel::NativeFloat
        );
        assert_eq!(add.kernel(Kind::Float, Kind::Int), Kernel::NativeFloat);
        assert_eq!(add.kernel(Kind::Object, Kind::Float), Kernel::MaskedObject);
        assert_eq!(add.kernel(Kind::Datetime, Kind::Float), Kernel::Unsupported);
        let gt = BinaryOp::Cmp(CmpOp::Gt);
        assert_eq!(gt.kernel(Kind::Bool, Kind::Float), Kernel::NativeFloat);
        assert_eq!(gt.kernel(Kind::Datetime, Kind::Datetime), Kernel::NativeDatetime);
        assert_eq!(gt.kernel(Kind::Object, Kind::Object), Kernel::MaskedObject);
        let and = BinaryOp::Logical(LogicalOp::And);
        assert_eq!(and.kernel(Kind::Bool, Kind::Bool), Kernel::NativeBool);
        assert_eq!(and.kernel(Kind::Bool, Kind::Object), Kernel::MaskedObject);
    }

    #[test]
    fn arithmetic_aligns_on_the_label_union() {
        let a = lettered(vec![1.0, 2.0], &["a", "b"]);
        let b = lettered(vec![10.0, 20.0], &["b", "c"]);
        let sum = (&a + &b).expect("add");
        assert_eq!(sum.labels(), &[Label::from("a"), Label::from("b"), Label::from("c")]);
        let values = sum.to_f64().expect("numeric");
        assert!(values[0].is_nan());
        assert_eq!(values[1], 12.0);
        assert!(values[2].is_nan());
    }

    #[test]
    fn names_survive_only_when_both_sides_agree() {
        let a = lettered(vec![1.0], &["a"]).named("x");
        let b = lettered(vec![2.0], &["a"]).named("x");
        let c = lettered(vec![2.0], &["a"]).named("y");
        assert_eq!((&a + &b).expect("add").name(), Some("x"));
        assert_eq!((&a + &c).expect("add").name(), None);
        assert_eq!((&a * 2.0).expect("mul").name(), Some("x"));
    }

    #[test]
    fn int_arithmetic_stays_int_except_true_division() {
        let a = Series::new(vec![7i64, -7]);
        let b = Series::new(vec![2i64, 2]);
        assert!(a.add(&b).expect("add").values().equals(&Values::Int(vec![9, -5])));
        assert!(a.floordiv(&b).expect("floordiv").values().equals(&Values::Int(vec![3, -4])));
        assert_eq!(a.div(&b).expect("div").kind(), Kind::Float);

        let negative = Series::new(vec![-1i64, -1]);
        let powed = b.pow(&negative).expect("pow falls back to float");
        assert_eq!(powed.to_f64().expect("numeric"), vec![0.5, 0.5]);

        let zero = Series::new(vec![0i64, 0]);
        let by_zero = a.floordiv(&zero).expect("floordiv by zero falls back to float");
        assert_eq!(by_zero.to_f64().expect("numeric"), vec![f64::INFINITY, f64::NEG_INFINITY]);
    }

    #[test]
    fn int_alignment_with_holes_is_unrepresentable() {
        let a = Series::new(vec![1i64, 2]);
        let b = Series::new(vec![1i64, 2, 3]);
        let err = a.add(&b).expect_err("hole in int buffer");
        assert!(matches!(err, SeriesError::UnrepresentableMissing(_)));
    }

    #[test]
    fn object_arithmetic_degrades_per_element() {
        let a = Series::from_scalars(
            vec![Scalar::from("x"), Scalar::Int(1), Scalar::from("y")],
            None,
            None,
        )
        .expect("object");
        let b = Series::from_scalars(
            vec![Scalar::from("z"), Scalar::Int(2), Scalar::Int(3)],
            None,
            None,
        )
        .expect("object");
        let sum = a.add(&b).expect("masked loop");
        assert_eq!(sum.iget(0).expect("0"), Scalar::from("xz"));
        assert_eq!(sum.iget(1).expect("1"), Scalar::Int(3));
        assert!(sum.values().is_missing_at(2));
    }

    #[test]
    fn comparisons_never_produce_missing() {
        let a = Series::new(vec![1.0, f64::NAN, 3.0]);
        let gt = a.gt(&Scalar::Float(2.0)).expect("gt");
        assert_eq!(bools(&gt), vec![false.into(), false.into(), true.into()]);
        let ne = a.cmp_ne(&Scalar::Float(1.0)).expect("ne");
        assert_eq!(bools(&ne), vec![false.into(), true.into(), true.into()]);

        let mixed = Series::from_scalars(vec![Scalar::from("a"), Scalar::Int(1)], None, None)
            .expect("object");
        let eq = mixed.cmp_eq(&Scalar::Int(1)).expect("masked comparison");
        assert_eq!(bools(&eq), vec![false.into(), true.into()]);
    }

    #[test]
    fn table_operands_are_declined() {
        let a = Series::new(vec![1.0]);
        let table = Table;
        let outcome = a
            .binary(BinaryOp::Cmp(CmpOp::Gt), Operand::Table(&table))
            .expect("declined");
        assert_eq!(outcome, OpOutcome::NotImplemented);
        let err = a.gt(&table as &dyn TableLike).expect_err("convenience surfaces the decline");
        assert!(matches!(err, SeriesError::NotSupported(_)));
    }

    #[test]
    fn logical_operators_dispatch_by_kind() {
        let a = Series::new(vec![Some(true), None, Some(false)]);
        let b = Series::new(vec![true, true, true]);
        let and = (&a & &b).expect("and");
        assert!(and.values().equals(&Values::from(vec![true, false, false])));
        let xor = (&a ^ &b).expect("xor");
        assert!(xor.values().equals(&Values::from(vec![false, true, true])));

        let ints = Series::new(vec![6i64, 3]);
        let masks = Series::new(vec![3i64, 1]);
        assert!((&ints | &masks).expect("or").values().equals(&Values::Int(vec![7, 3])));

        let mixed = Series::from_scalars(vec![Scalar::from(""), Scalar::Int(2)], None, None)
            .expect("object");
        let or = mixed.or(&Scalar::Bool(false)).expect("masked or");
        assert!(or.values().equals(&Values::from(vec![false, true])));
    }

    #[test]
    fn binop_fills_exactly_one_sided_gaps() {
        let a = lettered(vec![1.0, f64::NAN], &["x", "y"]);
        let b = lettered(vec![f64::NAN, 2.0], &["x", "y"]);
        let out = a
            .binop(&b, BinaryOp::Arith(ArithOp::Add), Some(&Scalar::Float(0.0)))
            .expect("binop");
        assert_eq!(out.to_f64().expect("numeric"), vec![1.0, 2.0]);

        let c = lettered(vec![f64::NAN, 5.0], &["x", "z"]);
        let out = a
            .binop(&c, BinaryOp::Arith(ArithOp::Add), Some(&Scalar::Float(0.0)))
            .expect("binop");
        assert_eq!(out.labels(), &[Label::from("x"), Label::from("y"), Label::from("z")]);
        let values = out.to_f64().expect("numeric");
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan(), "missing on one side and absent on the other");
        assert_eq!(values[2], 5.0);
    }

    #[test]
    fn binop_fill_lets_int_arrays_align() {
        let a = Series::new(vec![1i64, 2]);
        let b = Series::new(vec![10i64, 20, 30]);
        let out = a
            .binop(&b, BinaryOp::Arith(ArithOp::Add), Some(&Scalar::Int(0)))
            .expect("binop");
        assert!(out.values().equals(&Values::Int(vec![11, 22, 30])));
    }

    #[test]
    fn isin_between_and_negation() {
        let s = Series::new(vec![1.0, 2.0, f64::NAN]);
        let member = s.isin(&[Scalar::Int(2)]);
        assert!(member.values().equals(&Values::from(vec![false, true, false])));
        let inside = s.between(&Scalar::Int(1), &Scalar::Float(1.5));
        assert!(inside.values().equals(&Values::from(vec![true, false, false])));
        assert_eq!((-&s).expect("neg").iget(0).expect("0"), Scalar::Float(-1.0));
        assert_eq!(
            s.arith_reflected(ArithOp::Sub, &Scalar::Int(10)).expect("rsub").iget(1).expect("1"),
            Scalar::Float(8.0)
        );
        let text = Series::new(vec!["a"]);
        assert!(text.negate().is_err());
    }
}
