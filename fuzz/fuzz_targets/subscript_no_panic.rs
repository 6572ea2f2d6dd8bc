// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use labeled_series::{FillOptions, FillSpec, Key, Label};
use libfuzzer_sys::fuzz_target;

fn choose_key(cursor: &mut common::ByteCursor<'_>, len: usize) -> Key {
    match cursor.next_u8() % 4 {
        0 => Key::Label(common::choose_label(cursor)),
        1 => {
            let start = (cursor.next_u8() & 1 == 0).then(|| common::choose_label(cursor));
            let end = (cursor.next_u8() & 1 == 0).then(|| common::choose_label(cursor));
            Key::slice(start, end)
        }
        2 => {
            let count = common::bounded(cursor.next_u8(), 0, 8);
            Key::List((0..count).map(|_| common::choose_label(cursor)).collect())
        }
        _ => {
            let mask_len = if cursor.next_u8() % 4 == 0 { len + 1 } else { len };
            Key::Mask((0..mask_len).map(|_| cursor.next_u8() & 1 == 0).collect())
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);

    let len = common::bounded(cursor.next_u8(), 0, 64);
    let Some(mut series) = common::build_series(&mut cursor, len) else {
        return;
    };

    let key = choose_key(&mut cursor, series.len());
    let _ = series.subscript(&key);
    let _ = series.get(&common::choose_label(&mut cursor));
    let _ = series.iget(isize::from(cursor.next_i16()));
    let _ = series.iget_slice(
        Some(isize::from(cursor.next_i16() % 80)),
        Some(isize::from(cursor.next_i16() % 80)),
    );

    let before = series.clone();
    let value = common::choose_scalar(&mut cursor);
    if series.set(&key, &value).is_err() {
        assert!(series.equals(&before), "failed set must not write");
    }
    assert_eq!(series.len(), before.len(), "bracket set never changes length");

    let label = common::choose_label(&mut cursor);
    let existed = series.contains(&label);
    if series.set_value(label, &value).is_ok() && !existed {
        assert_eq!(series.len(), before.len() + 1);
    }

    let spec = FillSpec::Value(common::choose_scalar(&mut cursor));
    let _ = series.fillna(&spec, &FillOptions::default());
    let _ = series.asof(&Label::from(i64::from(cursor.next_u8() % 16)));
});
