// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::error::{Result, SeriesError};
use crate::scalar::Scalar;
use std::cmp::Ordering;

/// Arithmetic operator family.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Pow,
}

/// Comparison operator family.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

/// Boolean / bitwise operator family.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
    Xor,
}

impl ArithOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::FloorDiv => "floordiv",
            Self::Pow => "pow",
        }
    }

    pub fn apply_f64(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            Self::FloorDiv => (a / b).floor(),
            Self::Pow => a.powf(b),
        }
    }

    /// Integer kernel; `Div` is true division and is not handled here.
    ///
    /// Overflow wraps. Floor division by zero and a negative exponent are
    /// rejected.
    pub fn apply_i64(self, a: i64, b: i64) -> Result<i64> {
        Ok(match self {
            Self::Add => a.wrapping_add(b),
            Self::Sub => a.wrapping_sub(b),
            Self::Mul => a.wrapping_mul(b),
            Self::FloorDiv => floor_div_i64(a, b)?,
            Self::Pow => {
                let exp = u32::try_from(b).map_err(|_| {
                    SeriesError::invalid_input(format!(
                        "integer pow requires an exponent in [0, {}]; got {b}",
                        u32::MAX
                    ))
                })?;
                a.wrapping_pow(exp)
            }
            Self::Div => {
                return Err(SeriesError::not_supported(
                    "integer kernel does not implement true division",
                ));
            }
        })
    }

    /// Object-domain elementwise op. `None` marks an element the op is
    /// undefined for; callers write the missing sentinel there.
    pub fn apply_scalar(self, a: &Scalar, b: &Scalar) -> Option<Scalar> {
        if a.is_missing() || b.is_missing() {
            return None;
        }
        match (a, b) {
            (Scalar::Str(x), Scalar::Str(y)) if self == Self::Add => {
                Some(Scalar::Str(format!("{x}{y}")))
            }
            (Scalar::Str(x), Scalar::Int(n)) if self == Self::Mul => {
                usize::try_from(*n).ok().map(|n| Scalar::Str(x.repeat(n)))
            }
            (Scalar::Bool(_) | Scalar::Int(_), Scalar::Bool(_) | Scalar::Int(_))
                if self != Self::Div =>
            {
                let (x, y) = (a.as_i64()?, b.as_i64()?);
                Some(self.apply_i64(x, y).map_or_else(
                    |_| Scalar::Float(self.apply_f64(x as f64, y as f64)),
                    Scalar::Int,
                ))
            }
            (
                Scalar::Bool(_) | Scalar::Int(_) | Scalar::Float(_),
                Scalar::Bool(_) | Scalar::Int(_) | Scalar::Float(_),
            ) => Some(Scalar::Float(self.apply_f64(a.as_f64()?, b.as_f64()?))),
            _ => None,
        }
    }
}

fn floor_div_i64(a: i64, b: i64) -> Result<i64> {
    if b == 0 {
        return Err(SeriesError::invalid_input("integer floor division by zero"));
    }
    let q = a.wrapping_div(b);
    Ok(if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    })
}

impl CmpOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Eq => "eq",
            Self::Ne => "ne",
        }
    }

    /// Evaluates the operator on an optional ordering.
    ///
    /// An incomparable pair (`None`) is false for every operator except
    /// `Ne`, which is true.
    pub fn eval(self, ordering: Option<Ordering>) -> bool {
        match ordering {
            None => self == Self::Ne,
            Some(ord) => match self {
                Self::Gt => ord == Ordering::Greater,
                Self::Ge => ord != Ordering::Less,
                Self::Lt => ord == Ordering::Less,
                Self::Le => ord != Ordering::Greater,
                Self::Eq => ord == Ordering::Equal,
                Self::Ne => ord != Ordering::Equal,
            },
        }
    }

    pub fn apply_f64(self, a: f64, b: f64) -> bool {
        self.eval(a.partial_cmp(&b))
    }

    pub fn apply_scalar(self, a: &Scalar, b: &Scalar) -> bool {
        self.eval(a.compare(b))
    }
}

impl LogicalOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
        }
    }

    pub fn apply_bool(self, a: bool, b: bool) -> bool {
        match self {
            Self::And => a && b,
            Self::Or => a || b,
            Self::Xor => a ^ b,
        }
    }

    pub fn apply_i64(self, a: i64, b: i64) -> i64 {
        match self {
            Self::And => a & b,
            Self::Or => a | b,
            Self::Xor => a ^ b,
        }
    }

    /// Object-domain elementwise op on truthiness; a missing operand counts
    /// as false.
    pub fn apply_scalar(self, a: &Scalar, b: &Scalar) -> bool {
        self.apply_bool(a.truthy(), b.truthy())
    }
}
