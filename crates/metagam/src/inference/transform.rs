//! Temperature-scaled softmax.
//!
//! [`TemperedSoftmax`] turns summed class scores into calibrated
//! probabilities: `p = softmax(score / temperature)`.

use ndarray::{ArrayViewMut1, ArrayViewMut2};

use crate::DEFAULT_TEMPERATURE;

/// Softmax over the class axis with a fixed temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperedSoftmax {
    temperature: f32,
}

impl TemperedSoftmax {
    /// Create with the given temperature. Callers validate positivity
    /// (see [`AdditiveConfig`](crate::model::AdditiveConfig)).
    pub fn new(temperature: f32) -> Self {
        Self { temperature }
    }

    #[inline]
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Transform a `[n_rows, n_classes]` score matrix in place.
    ///
    /// # Numerical Stability
    ///
    /// Subtracts the row max before exponentiating.
    ///
    /// # NaN/Inf Behavior
    ///
    /// Non-finite scores propagate to non-finite outputs; callers detect them.
    pub fn transform_inplace(&self, mut scores: ArrayViewMut2<'_, f32>) {
        let inv_t = 1.0 / self.temperature;
        scores.mapv_inplace(|x| x * inv_t);
        for row in scores.rows_mut() {
            softmax_inplace(row);
        }
    }
}

impl Default for TemperedSoftmax {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPERATURE)
    }
}

/// Numerically stable softmax in-place.
#[inline]
fn softmax_inplace(mut row: ArrayViewMut1<'_, f32>) {
    if row.is_empty() {
        return;
    }

    let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

    let mut sum = 0.0f32;
    for x in row.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }

    if sum > 0.0 {
        row.mapv_inplace(|x| x / sum);
    }
}
