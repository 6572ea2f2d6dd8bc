// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(dead_code)]

use labeled_core::{ArithOp, CmpOp, FillMethod, LogicalOp, Scalar};
use labeled_index::{JoinHow, Label, LabelIndex};
use labeled_series::{BinaryOp, Series};

pub const MAX_VALUE_LEN: usize = 512;

pub struct ByteCursor<'a> {
    data: &'a [u8],
    idx: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, idx: 0 }
    }

    pub fn next_u8(&mut self) -> u8 {
        let value = self.data.get(self.idx).copied().unwrap_or(0);
        self.idx = self.idx.saturating_add(1);
        value
    }

    pub fn next_i16(&mut self) -> i16 {
        let bytes = [self.next_u8(), self.next_u8()];
        i16::from_le_bytes(bytes)
    }

    pub fn next_f64(&mut self) -> f64 {
        let mut raw = [0_u8; 8];
        for byte in &mut raw {
            *byte = self.next_u8();
        }
        let value = f64::from_le_bytes(raw);
        if value.is_finite() {
            value.clamp(-1.0e9, 1.0e9)
        } else {
            f64::NAN
        }
    }
}

pub fn bounded(seed: u8, min: usize, max_inclusive: usize) -> usize {
    if max_inclusive <= min {
        min
    } else {
        min + (usize::from(seed) % (max_inclusive - min + 1))
    }
}

/// One label drawn from a small space so that collisions are common.
pub fn choose_label(cursor: &mut ByteCursor<'_>) -> Label {
    let seed = cursor.next_u8();
    match seed % 5 {
        0 | 1 => Label::from(i64::from(seed % 16)),
        2 | 3 => Label::from(format!("k{}", seed % 12)),
        _ => Label::from((i64::from(seed % 3), format!("k{}", seed % 4))),
    }
}

pub fn choose_scalar(cursor: &mut ByteCursor<'_>) -> Scalar {
    match cursor.next_u8() % 6 {
        0 => Scalar::Missing,
        1 => Scalar::Bool(cursor.next_u8() & 1 == 0),
        2 => Scalar::Int(i64::from(cursor.next_i16())),
        3 => Scalar::from(format!("s{}", cursor.next_u8() % 8)),
        _ => Scalar::Float(cursor.next_f64()),
    }
}

/// An array with `len` labels that may repeat and mix kinds.
pub fn build_series(cursor: &mut ByteCursor<'_>, len: usize) -> Option<Series> {
    let len = len.min(MAX_VALUE_LEN);
    let uniform = cursor.next_u8() % 3;
    let labels: Vec<Label> = (0..len).map(|_| choose_label(cursor)).collect();
    let values: Vec<Scalar> = (0..len)
        .map(|_| match uniform {
            0 => Scalar::Float(cursor.next_f64()),
            1 => Scalar::Int(i64::from(cursor.next_i16())),
            _ => choose_scalar(cursor),
        })
        .collect();
    Series::from_scalars(values, Some(LabelIndex::new(labels)), None).ok()
}

pub fn choose_join(seed: u8) -> JoinHow {
    match seed % 4 {
        0 => JoinHow::Outer,
        1 => JoinHow::Inner,
        2 => JoinHow::Left,
        _ => JoinHow::Right,
    }
}

pub fn choose_method(seed: u8) -> Option<FillMethod> {
    match seed % 3 {
        0 => None,
        1 => Some(FillMethod::Pad),
        _ => Some(FillMethod::Backfill),
    }
}

pub fn choose_op(seed: u8) -> BinaryOp {
    match seed % 9 {
        0 => BinaryOp::Arith(ArithOp::Add),
        1 => BinaryOp::Arith(ArithOp::Div),
        2 => BinaryOp::Arith(ArithOp::FloorDiv),
        3 => BinaryOp::Arith(ArithOp::Pow),
        4 => BinaryOp::Cmp(CmpOp::Lt),
        5 => BinaryOp::Cmp(CmpOp::Eq),
        6 => BinaryOp::Logical(LogicalOp::And),
        7 => BinaryOp::Logical(LogicalOp::Xor),
        _ => BinaryOp::Arith(ArithOp::Mul),
    }
}
