//! Accelerator inference path.
//!
//! Not implemented yet. The intended pipeline keeps test features resident
//! on the accelerator: standardize with training statistics, clamp, then
//! evaluate the binned lookup there. Only the standardization step exists;
//! [`AcceleratorPredictor::predict_proba`] fails fast with
//! [`Error::UnsupportedDevicePath`] instead of falling back to the CPU.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use tracing::debug;

use super::path::AdditivePredict;
use crate::device::Device;
use crate::error::{Error, Result, ShapeError};
use crate::model::AdditiveModel;
use crate::utils::{nan_mean, nan_std};

/// Added to every defined, non-zero standard deviation.
pub const STD_EPSILON: f32 = 1e-6;

/// Standardized values are clamped to `[-CLAMP_LIMIT, CLAMP_LIMIT]`.
pub const CLAMP_LIMIT: f32 = 100.0;

/// Per-feature standardization fitted on training features.
///
/// - mean: NaN-skipping mean, or `0` when a column has no values
/// - std: NaN-skipping sample std (ddof = 1) plus [`STD_EPSILON`], or `1`
///   when the std is zero or undefined
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    mean: Array1<f32>,
    std: Array1<f32>,
}

impl Standardizer {
    pub fn fit(x_train: ArrayView2<'_, f32>) -> Self {
        let n_features = x_train.ncols();
        let mut mean = Array1::zeros(n_features);
        let mut std = Array1::ones(n_features);

        for (feature, column) in x_train.columns().into_iter().enumerate() {
            mean[feature] = nan_mean(column).unwrap_or(0.0) as f32;
            std[feature] = match nan_std(column) {
                Some(s) if s > 0.0 => s as f32 + STD_EPSILON,
                _ => 1.0,
            };
        }

        Self { mean, std }
    }

    #[inline]
    pub fn mean(&self) -> ArrayView1<'_, f32> {
        self.mean.view()
    }

    #[inline]
    pub fn std(&self) -> ArrayView1<'_, f32> {
        self.std.view()
    }

    /// Zero-fill missing values, standardize and clamp.
    pub fn transform(&self, x: ArrayView2<'_, f32>) -> std::result::Result<Array2<f32>, ShapeError> {
        if x.ncols() != self.mean.len() {
            return Err(ShapeError::FeatureCountMismatch {
                expected: self.mean.len(),
                got: x.ncols(),
            });
        }

        let mut out = x.mapv(|v| if v.is_nan() { 0.0 } else { v });
        for mut row in out.rows_mut() {
            Zip::from(&mut row)
                .and(&self.mean)
                .and(&self.std)
                .for_each(|v, &m, &s| *v = ((*v - m) / s).clamp(-CLAMP_LIMIT, CLAMP_LIMIT));
        }
        Ok(out)
    }
}

/// Accelerator predictor. Holds the standardization statistics; prediction
/// is not available.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceleratorPredictor {
    device: Device,
    scaler: Standardizer,
}

impl AcceleratorPredictor {
    /// Prepare an accelerator predictor from the training features.
    pub fn new(device: Device, x_train: ArrayView2<'_, f32>) -> Self {
        debug!(%device, n_features = x_train.ncols(), "fitted accelerator standardization");
        Self {
            device,
            scaler: Standardizer::fit(x_train),
        }
    }

    #[inline]
    pub fn scaler(&self) -> &Standardizer {
        &self.scaler
    }
}

impl AdditivePredict for AcceleratorPredictor {
    fn device(&self) -> Device {
        self.device
    }

    fn predict_proba(&self, _x: ArrayView2<'_, f32>, _model: &AdditiveModel) -> Result<Array2<f32>> {
        Err(Error::UnsupportedDevicePath { device: self.device })
    }
}
