//! Common utilities used across the crate.
//!
//! This module provides column statistics and the parallelism flag used by
//! the binning and inference engines.

use rayon::prelude::*;

// =============================================================================
// Statistical Utilities
// =============================================================================

/// Empirical quantile of an ascending slice with linear interpolation.
///
/// Uses the position `q * (n - 1)` and interpolates between the two
/// neighbouring order statistics, matching the default quantile definition
/// of the common array libraries.
///
/// # Arguments
/// * `sorted` - Values sorted in ascending order (no NaN)
/// * `q` - Quantile level in `[0, 1]`
///
/// # Returns
/// The interpolated quantile, never NaN for non-empty input. Returns
/// `f64::NAN` if `sorted` is empty.
#[inline]
pub fn linear_quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = pos - lo as f64;

    // inf - inf is NaN; keep the lower order statistic instead.
    if frac == 0.0 || sorted[lo] == sorted[hi] {
        return sorted[lo];
    }
    let value = sorted[lo] + (sorted[hi] - sorted[lo]) * frac;
    if value.is_nan() { sorted[lo] } else { value }
}

/// Mean of the non-NaN values, or `None` if every value is NaN.
pub fn nan_mean<'a>(values: impl IntoIterator<Item = &'a f32>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0f64, 0usize), |(s, c), &v| (s + v as f64, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Sample standard deviation (ddof = 1) of the non-NaN values.
///
/// Returns `None` when fewer than two values are present, since the
/// estimate is undefined.
pub fn nan_std<'a>(values: impl IntoIterator<Item = &'a f32> + Clone) -> Option<f64> {
    let mean = nan_mean(values.clone())?;
    let (sq, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0f64, 0usize), |(s, c), &v| {
            let d = v as f64 - mean;
            (s + d * d, c + 1)
        });
    (count > 1).then(|| (sq / (count - 1) as f64).sqrt())
}

// =============================================================================
// Parallelism Configuration
// =============================================================================

/// Whether parallel execution is allowed.
///
/// When `Parallel`, components may use `rayon` parallel iterators. Results
/// never depend on this flag: every parallel loop writes disjoint outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Parallelism {
    #[default]
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Returns `true` if parallel execution is allowed.
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, iter: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().map(f).collect()
        } else {
            iter.into_iter().map(f).collect()
        }
    }
}
