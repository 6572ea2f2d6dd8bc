// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use labeled_series::{Label, LabelIndex, Result, Series};

/// Deterministic benchmark inputs for the labeled workspace.
pub fn crate_name() -> &'static str {
    "labeled-bench"
}

pub fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

/// Smooth float values with every `missing_every`-th slot missing
/// (`0` disables gaps).
pub fn wave_values(n: usize, missing_every: usize) -> Vec<f64> {
    (0..n)
        .map(|idx| {
            if missing_every > 0 && idx % missing_every == missing_every - 1 {
                f64::NAN
            } else {
                let x = idx as f64;
                x.sin() + x.cos() * 0.1
            }
        })
        .collect()
}

/// Sorted integer labels `start, start + step, ...`.
pub fn stepped_index(n: usize, start: i64, step: i64) -> LabelIndex {
    (0..n as i64).map(|i| Label::from(start + i * step)).collect()
}

/// Unique integer labels in a pseudo-random order.
pub fn shuffled_index(n: usize, seed: u64) -> LabelIndex {
    let mut keys: Vec<i64> = (0..n as i64).collect();
    let mut state = seed;
    for i in (1..keys.len()).rev() {
        let j = (lcg_next(&mut state) as usize) % (i + 1);
        keys.swap(i, j);
    }
    keys.into_iter().map(Label::from).collect()
}

/// A float array over `index` with periodic gaps.
pub fn wave_series(index: LabelIndex, missing_every: usize) -> Result<Series> {
    let values = wave_values(index.len(), missing_every);
    Series::with_index(values, index)
}
