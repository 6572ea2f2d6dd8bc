// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use labeled_series::{AlignOptions, OrderOptions, ReindexOptions};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);

    let left_len = common::bounded(cursor.next_u8(), 0, 48);
    let right_len = common::bounded(cursor.next_u8(), 0, 48);
    let join_seed = cursor.next_u8();
    let method_seed = cursor.next_u8();
    let op_seed = cursor.next_u8();
    let limit_seed = cursor.next_u8();

    let Some(left) = common::build_series(&mut cursor, left_len) else {
        return;
    };
    let Some(right) = common::build_series(&mut cursor, right_len) else {
        return;
    };
    let fill = common::choose_scalar(&mut cursor);
    let limit = (limit_seed % 4 != 0).then_some(usize::from(limit_seed % 4));

    let options = AlignOptions {
        join: common::choose_join(join_seed),
        fill_value: (method_seed & 8 == 0).then(|| fill.clone()),
        ..AlignOptions::default()
    };
    if let Ok((a, b)) = left.align(&right, &options) {
        assert_eq!(a.len(), b.len());
        assert_eq!(a.labels(), b.labels());
    }

    let op = common::choose_op(op_seed);
    if let Ok(out) = left.binop(&right, op, Some(&fill)) {
        assert!(out.len() >= left.len().max(right.len()));
    }
    let _ = left.binary(op, (&right).into());

    let reindexed = left.reindex(
        Some(Arc::new(right.index().clone())),
        &ReindexOptions {
            method: common::choose_method(method_seed),
            limit,
            ..ReindexOptions::default()
        },
    );
    if let Ok(out) = reindexed {
        assert_eq!(out.labels(), right.labels());
    }

    if let Ok(out) = left.combine_first(&right) {
        assert!(out.len() >= left.len().max(right.len()));
    }
    if let Ok(sorted) = left.order(&OrderOptions::default()) {
        assert_eq!(sorted.len(), left.len());
    }
    let _ = left.sort_index(method_seed & 1 == 0);
});
