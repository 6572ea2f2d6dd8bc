// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod index;
pub mod join;
pub mod label;
pub mod strategy;

pub use index::{IndexKind, LabelIndex, Located};
pub use join::{JoinHow, JoinResult};
pub use label::Label;
pub use strategy::{AxisStrategy, LabelOffset, strategy_for};

/// Label index collaborator for labeled arrays.
pub fn crate_name() -> &'static str {
    "labeled-index"
}
