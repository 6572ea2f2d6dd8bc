// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Masked numeric kernels over `f64` buffers where `NaN` marks missing.
//!
//! Every reduction takes a `skipna` flag. With `skipna = true` missing slots
//! are excluded before computing; with `skipna = false` any missing slot
//! makes the result `NaN`.

use std::cmp::Ordering;

/// Computes a compensated sum using Kahan summation.
///
/// Empty input returns `0.0`.
pub fn kahan_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut c = 0.0;
    for &value in values {
        let t = sum + value;
        if sum.abs() >= value.abs() {
            c += (sum - t) + value;
        } else {
            c += (value - t) + sum;
        }
        sum = t;
    }
    sum + c
}

/// Computes the mean using Welford's online update.
///
/// Empty input returns `NaN`.
pub fn stable_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut mean = 0.0;
    for (idx, &value) in values.iter().enumerate() {
        mean += (value - mean) / (idx + 1) as f64;
    }
    mean
}

/// Compensated sum of `(x - mean)^power` over `values`.
fn central_moment_sum(values: &[f64], mean: f64, power: i32) -> f64 {
    let mut sum = 0.0;
    let mut c = 0.0;
    for &value in values {
        let term = (value - mean).powi(power);
        let y = term - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }
    sum
}

/// Variance with `n - ddof` normalization; `NaN` when `n <= ddof`.
///
/// Round-off below zero is clamped to `0.0`.
pub fn stable_variance(values: &[f64], ddof: usize) -> f64 {
    let n = values.len();
    if n <= ddof {
        return f64::NAN;
    }
    let mean = stable_mean(values);
    let variance = central_moment_sum(values, mean, 2) / (n - ddof) as f64;
    if variance <= 0.0 { 0.0 } else { variance }
}

/// Removes missing slots, or returns `None` when one is present and
/// `skipna` is false.
pub fn valid_values(values: &[f64], skipna: bool) -> Option<Vec<f64>> {
    if !skipna && values.iter().any(|v| v.is_nan()) {
        return None;
    }
    Some(values.iter().copied().filter(|v| !v.is_nan()).collect())
}

/// Number of non-missing slots.
pub fn nancount(values: &[f64]) -> usize {
    values.iter().filter(|v| !v.is_nan()).count()
}

/// Masked reduction kernels.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NanKernel {
    Sum,
    Prod,
    Mean,
    Median,
    Min,
    Max,
    Var { ddof: usize },
    Std { ddof: usize },
    Skew,
    Kurt,
    Mad,
}

impl NanKernel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Prod => "prod",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
            Self::Var { .. } => "var",
            Self::Std { .. } => "std",
            Self::Skew => "skew",
            Self::Kurt => "kurt",
            Self::Mad => "mad",
        }
    }

    /// Applies the kernel.
    ///
    /// Empty input after exclusion: `Sum` is `0`, `Prod` is `1`, everything
    /// else is `NaN`. `Skew` needs three values and `Kurt` four.
    pub fn apply(self, values: &[f64], skipna: bool) -> f64 {
        let Some(valid) = valid_values(values, skipna) else {
            return f64::NAN;
        };
        tracing::trace!(kernel = self.as_str(), n = valid.len(), "nan kernel");
        match self {
            Self::Sum => kahan_sum(&valid),
            Self::Prod => valid.iter().product(),
            Self::Mean => stable_mean(&valid),
            Self::Median => quantile_sorted(&sorted(valid), 0.5),
            Self::Min => valid.iter().copied().reduce(f64::min).unwrap_or(f64::NAN),
            Self::Max => valid.iter().copied().reduce(f64::max).unwrap_or(f64::NAN),
            Self::Var { ddof } => stable_variance(&valid, ddof),
            Self::Std { ddof } => stable_variance(&valid, ddof).sqrt(),
            Self::Skew => skew(&valid),
            Self::Kurt => kurt(&valid),
            Self::Mad => {
                if valid.is_empty() {
                    return f64::NAN;
                }
                let mean = stable_mean(&valid);
                let deviations: Vec<f64> = valid.iter().map(|v| (v - mean).abs()).collect();
                stable_mean(&deviations)
            }
        }
    }
}

/// Bias-adjusted sample skewness (G1); `0` for constant input.
fn skew(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 3 {
        return f64::NAN;
    }
    let mean = stable_mean(values);
    let m2 = central_moment_sum(values, mean, 2) / n;
    if m2 <= 0.0 {
        return 0.0;
    }
    let m3 = central_moment_sum(values, mean, 3) / n;
    (n * (n - 1.0)).sqrt() / (n - 2.0) * m3 / m2.powf(1.5)
}

/// Bias-adjusted sample excess kurtosis (G2); `0` for constant input.
fn kurt(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 4 {
        return f64::NAN;
    }
    let mean = stable_mean(values);
    let m2 = central_moment_sum(values, mean, 2) / n;
    if m2 <= 0.0 {
        return 0.0;
    }
    let m4 = central_moment_sum(values, mean, 4) / n;
    let numerator = (n * n - 1.0) * m4 / (m2 * m2) - 3.0 * (n - 1.0).powi(2);
    numerator / ((n - 2.0) * (n - 3.0))
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = q * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Linear-interpolated quantile over non-missing values; `q` in `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    quantile_sorted(&sorted(valid), q)
}

fn nanarg_by(values: &[f64], skipna: bool, better: impl Fn(f64, f64) -> bool) -> Option<usize> {
    if !skipna && values.iter().any(|v| v.is_nan()) {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for (pos, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if !better(value, current) => {}
            _ => best = Some((pos, value)),
        }
    }
    best.map(|(pos, _)| pos)
}

/// Position of the first minimum, `None` when no value qualifies.
pub fn nanargmin(values: &[f64], skipna: bool) -> Option<usize> {
    nanarg_by(values, skipna, |candidate, current| candidate < current)
}

/// Position of the first maximum, `None` when no value qualifies.
pub fn nanargmax(values: &[f64], skipna: bool) -> Option<usize> {
    nanarg_by(values, skipna, |candidate, current| candidate > current)
}

fn pairwise_complete(a: &[f64], b: &[f64]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(x, y)| (*x, *y))
        .unzip()
}

/// Covariance over pairwise-complete observations with `n - ddof`
/// normalization.
pub fn nancov(a: &[f64], b: &[f64], ddof: usize) -> f64 {
    let (x, y) = pairwise_complete(a, b);
    if x.len() <= ddof {
        return f64::NAN;
    }
    let mx = stable_mean(&x);
    let my = stable_mean(&y);
    let products: Vec<f64> = x.iter().zip(&y).map(|(a, b)| (a - mx) * (b - my)).collect();
    kahan_sum(&products) / (x.len() - ddof) as f64
}

/// Pearson correlation over pairwise-complete observations.
pub fn nancorr(a: &[f64], b: &[f64]) -> f64 {
    let (x, y) = pairwise_complete(a, b);
    if x.len() < 2 {
        return f64::NAN;
    }
    let sx = stable_variance(&x, 1).sqrt();
    let sy = stable_variance(&y, 1).sqrt();
    if sx == 0.0 || sy == 0.0 {
        return f64::NAN;
    }
    nancov(&x, &y, 1) / (sx * sy)
}

/// Running accumulations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CumKernel {
    Sum,
    Prod,
    Max,
    Min,
}

impl CumKernel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "cumsum",
            Self::Prod => "cumprod",
            Self::Max => "cummax",
            Self::Min => "cummin",
        }
    }

    fn step(self, acc: f64, value: f64) -> f64 {
        match self {
            Self::Sum => acc + value,
            Self::Prod => acc * value,
            Self::Max => acc.max(value),
            Self::Min => acc.min(value),
        }
    }

    /// Running accumulation.
    ///
    /// With `skipna` missing slots stay missing and the accumulation carries
    /// across them; without it, every slot from the first missing on is
    /// missing.
    pub fn apply(self, values: &[f64], skipna: bool) -> Vec<f64> {
        let mut out = Vec::with_capacity(values.len());
        let mut acc: Option<f64> = None;
        let mut poisoned = false;
        for &value in values {
            if poisoned {
                out.push(f64::NAN);
                continue;
            }
            if value.is_nan() {
                poisoned = !skipna;
                out.push(f64::NAN);
                continue;
            }
            let next = acc.map_or(value, |acc| self.step(acc, value));
            acc = Some(next);
            out.push(next);
        }
        out
    }

    /// Running accumulation over integers, which have no missing slots.
    /// Overflow wraps.
    pub fn apply_i64(self, values: &[i64]) -> Vec<i64> {
        let mut acc: Option<i64> = None;
        values
            .iter()
            .map(|&value| {
                let next = acc.map_or(value, |acc| match self {
                    Self::Sum => acc.wrapping_add(value),
                    Self::Prod => acc.wrapping_mul(value),
                    Self::Max => acc.max(value),
                    Self::Min => acc.min(value),
                });
                acc = Some(next);
                next
            })
            .collect()
    }
}

/// Tie-breaking rule for ranking.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RankTies {
    #[default]
    Average,
    Min,
    Max,
    First,
}

/// One-based ranks; missing slots rank as `NaN`.
pub fn rank(values: &[f64], ties: RankTies, ascending: bool) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).filter(|&i| !values[i].is_nan()).collect();
    order.sort_by(|&a, &b| {
        let ord = values[a].total_cmp(&values[b]);
        if ascending { ord } else { ord.reverse() }
    });
    let mut ranks = vec![f64::NAN; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]].total_cmp(&values[order[start]]) == Ordering::Equal
        {
            end += 1;
        }
        for (offset, &pos) in order[start..end].iter().enumerate() {
            ranks[pos] = match ties {
                RankTies::Average => (start + end + 1) as f64 / 2.0,
                RankTies::Min => (start + 1) as f64,
                RankTies::Max => end as f64,
                RankTies::First => (start + offset + 1) as f64,
            };
        }
        start = end;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::{
        CumKernel, NanKernel, RankTies, kahan_sum, nanargmax, nanargmin, nancorr, nancov,
        quantile, rank, stable_mean, stable_variance,
    };

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "expected {expected}, got {actual}, |diff|={diff}, tol={tol}"
        );
    }

    const NAN: f64 = f64::NAN;

    #[test]
    fn kahan_sum_improves_cancellation_accuracy() {
        let values = [1e16, 1.0, -1e16];
        let naive: f64 = values.iter().sum();
        assert_eq!(naive, 0.0);
        assert_close(kahan_sum(&values), 1.0, 1e-12);
    }

    #[test]
    fn stable_stats_near_constant_large_magnitude() {
        let values = [1e12 + 1.0, 1e12 + 2.0, 1e12 + 3.0, 1e12 + 4.0];
        assert_close(stable_mean(&values), 1e12 + 2.5, 1e-3);
        assert_close(stable_variance(&values, 0), 1.25, 1e-6);
        assert_close(stable_variance(&values, 1), 5.0 / 3.0, 1e-6);
        assert!(stable_variance(&[1.0], 1).is_nan());
    }

    #[test]
    fn skipna_controls_missing_exclusion() {
        let values = [1.0, NAN, 3.0];
        assert_eq!(NanKernel::Sum.apply(&values, true), 4.0);
        assert!(NanKernel::Sum.apply(&values, false).is_nan());
        assert_eq!(NanKernel::Mean.apply(&values, true), 2.0);
        assert_eq!(NanKernel::Max.apply(&values, true), 3.0);
        assert!(NanKernel::Min.apply(&values, false).is_nan());
    }

    #[test]
    fn empty_reductions_follow_identity_rules() {
        let all_missing = [NAN, NAN];
        assert_eq!(NanKernel::Sum.apply(&all_missing, true), 0.0);
        assert_eq!(NanKernel::Prod.apply(&all_missing, true), 1.0);
        assert!(NanKernel::Mean.apply(&all_missing, true).is_nan());
        assert!(NanKernel::Median.apply(&[], true).is_nan());
        assert!(NanKernel::Max.apply(&[], true).is_nan());
    }

    #[test]
    fn variance_defaults_to_sample_normalization() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_close(NanKernel::Var { ddof: 0 }.apply(&values, true), 4.0, 1e-12);
        assert_close(NanKernel::Std { ddof: 0 }.apply(&values, true), 2.0, 1e-12);
        assert_close(NanKernel::Var { ddof: 1 }.apply(&values, true), 32.0 / 7.0, 1e-12);
    }

    #[test]
    fn higher_moments_match_reference_values() {
        let values = [1.0, 2.0, 3.0, 10.0];
        assert_close(NanKernel::Skew.apply(&values, true), 1.763_632_614_8, 1e-8);
        assert_close(NanKernel::Kurt.apply(&values, true), 3.228, 1e-8);
        assert!(NanKernel::Skew.apply(&[1.0, 2.0], true).is_nan());
        assert!(NanKernel::Kurt.apply(&[1.0, 2.0, 3.0], true).is_nan());
        assert_eq!(NanKernel::Skew.apply(&[5.0, 5.0, 5.0], true), 0.0);
    }

    #[test]
    fn median_and_quantile_interpolate_linearly() {
        assert_eq!(NanKernel::Median.apply(&[3.0, NAN, 1.0, 2.0], true), 2.0);
        assert_eq!(NanKernel::Median.apply(&[4.0, 1.0, 2.0, 3.0], true), 2.5);
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.25), 2.0);
        assert_close(quantile(&[1.0, 2.0], 0.1), 1.1, 1e-12);
        assert!(quantile(&[1.0], 1.5).is_nan());
    }

    #[test]
    fn mad_is_mean_absolute_deviation() {
        assert_close(NanKernel::Mad.apply(&[1.0, 2.0, 3.0, 4.0], true), 1.0, 1e-12);
    }

    #[test]
    fn argextrema_return_first_occurrence() {
        let values = [3.0, 1.0, NAN, 1.0, 5.0, 5.0];
        assert_eq!(nanargmin(&values, true), Some(1));
        assert_eq!(nanargmax(&values, true), Some(4));
        assert_eq!(nanargmin(&values, false), None);
        assert_eq!(nanargmax(&[NAN, NAN], true), None);
    }

    #[test]
    fn correlation_uses_pairwise_complete_values() {
        let a = [1.0, 2.0, 3.0, NAN];
        let b = [2.0, 4.0, 6.0, 1.0];
        assert_close(nancorr(&a, &b), 1.0, 1e-12);
        assert_close(nancov(&a, &b, 1), 2.0, 1e-12);
        assert!(nancorr(&[1.0, 1.0], &[2.0, 3.0]).is_nan());
    }

    #[test]
    fn cumulative_kernels_keep_missing_positions() {
        let values = [1.0, NAN, 2.0, 3.0];
        let skipped = CumKernel::Sum.apply(&values, true);
        assert_eq!(skipped[0], 1.0);
        assert!(skipped[1].is_nan());
        assert_eq!(skipped[2], 3.0);
        assert_eq!(skipped[3], 6.0);

        let poisoned = CumKernel::Sum.apply(&values, false);
        assert_eq!(poisoned[0], 1.0);
        assert!(poisoned[2..].iter().all(|v| v.is_nan()));

        assert_eq!(CumKernel::Max.apply(&[1.0, 3.0, 2.0], true), vec![1.0, 3.0, 3.0]);
    }

    #[test]
    fn rank_breaks_ties_by_rule() {
        let values = [10.0, 20.0, 10.0, NAN];
        let average = rank(&values, RankTies::Average, true);
        assert_eq!(&average[..3], &[1.5, 3.0, 1.5]);
        assert!(average[3].is_nan());
        assert_eq!(&rank(&values, RankTies::Min, true)[..3], &[1.0, 3.0, 1.0]);
        assert_eq!(&rank(&values, RankTies::Max, true)[..3], &[2.0, 3.0, 2.0]);
        assert_eq!(&rank(&values, RankTies::First, true)[..3], &[1.0, 3.0, 2.0]);
        assert_eq!(&rank(&values, RankTies::Min, false)[..3], &[2.0, 1.0, 2.0]);
    }
}
