// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod error;
pub mod fill;
pub mod kernels;
pub mod missing;
pub mod ops;
pub mod scalar;
pub mod values;

pub use error::{Result, SeriesError, normalize_position};
pub use fill::FillMethod;
pub use kernels::{CumKernel, NanKernel, RankTies};
pub use missing::{MissingSide, NaAction};
pub use ops::{ArithOp, CmpOp, LogicalOp};
pub use scalar::{Kind, Scalar, ScalarKey, infer_kind};
pub use values::Values;

/// Core element kinds, scalars and masked kernels for labeled arrays.
pub fn crate_name() -> &'static str {
    "labeled-core"
}
