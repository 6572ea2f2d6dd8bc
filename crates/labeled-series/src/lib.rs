// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod align;
pub mod apply;
pub mod combine;
pub mod fill;
pub mod grouping;
pub mod indexing;
pub mod ops;
pub mod reduce;
pub mod reindex;
pub mod series;
pub mod sort;
pub mod stats;
pub mod summary;
pub mod text;

pub use align::AlignOptions;
pub use apply::{ApplyArg, ApplyOut};
pub use fill::{FillOptions, FillSpec, InterpolateMethod, ReplaceSpec};
pub use grouping::LevelGrouper;
pub use indexing::{Key, Selection};
pub use labeled_core::{
    ArithOp, CmpOp, FillMethod, Kind, LogicalOp, NaAction, RankTies, Result, Scalar, SeriesError,
    Values,
};
pub use labeled_index::{JoinHow, Label, LabelIndex, LabelOffset};
pub use ops::{BinaryOp, OpOutcome, Operand, TableLike};
pub use reduce::{ReduceOptions, Reduced, Stat};
pub use reindex::ReindexOptions;
pub use series::Series;
pub use sort::{OrderOptions, RankOptions, SortKind};
pub use summary::{Summarizable, Summary, SummaryStats};
pub use text::TextOps;

/// One-dimensional labeled arrays with alignment-aware operations.
pub fn crate_name() -> &'static str {
    "labeled-series"
}
