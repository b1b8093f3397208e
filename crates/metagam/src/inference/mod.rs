//! Binned inference with extracted additive models.
//!
//! [`predict_proba`] evaluates an [`AdditiveModel`] on test features:
//! each value is mapped to its bin, the bin contributions are summed per
//! class, the bias is added and a tempered softmax turns scores into
//! probabilities.
//!
//! Two paths exist, chosen from `inference_device`:
//! - [`CpuPredictor`]: the complete implementation
//! - [`AcceleratorPredictor`]: fails fast with
//!   [`Error::UnsupportedDevicePath`](crate::Error::UnsupportedDevicePath)

mod accelerator;
mod cpu;
mod path;
mod transform;

pub use accelerator::{AcceleratorPredictor, CLAMP_LIMIT, STD_EPSILON, Standardizer};
pub use cpu::CpuPredictor;
pub use path::{AdditivePredict, InferencePath};
pub use transform::TemperedSoftmax;

use ndarray::{Array2, ArrayView2};

use crate::error::{ConfigError, Result, ShapeError};
use crate::model::{AdditiveConfig, AdditiveModel};

/// Class probabilities `[n_test, n_classes]` for `x_test`.
///
/// `x_train` is the training feature matrix the model was extracted from;
/// only the accelerator path uses it.
///
/// # Errors
///
/// - [`ConfigError::ArtifactDeviceMismatch`] if the artifact does not live on
///   `config.inference_device`
/// - [`ShapeError::BinCountMismatch`] if `config.n_bins` disagrees with the artifact
/// - [`ShapeError::FeatureCountMismatch`] if `x_test` has the wrong width
/// - [`Error::NonFiniteOutput`](crate::Error::NonFiniteOutput) if a row's
///   probabilities are not finite
/// - [`Error::UnsupportedDevicePath`](crate::Error::UnsupportedDevicePath)
///   for accelerator devices
pub fn predict_proba(
    x_train: ArrayView2<'_, f32>,
    x_test: ArrayView2<'_, f32>,
    model: &AdditiveModel,
    config: &AdditiveConfig,
) -> Result<Array2<f32>> {
    let path = InferencePath::new(x_train, config);
    predict_with(&path, x_test, model, config)
}

/// Run a prepared inference path after checking the artifact against it.
pub(crate) fn predict_with<P: AdditivePredict + ?Sized>(
    path: &P,
    x_test: ArrayView2<'_, f32>,
    model: &AdditiveModel,
    config: &AdditiveConfig,
) -> Result<Array2<f32>> {
    if model.device() != path.device() {
        return Err(ConfigError::ArtifactDeviceMismatch {
            artifact: model.device(),
            requested: path.device(),
        }
        .into());
    }
    if let Some(expected) = config.n_bins
        && expected as usize != model.n_bins()
    {
        return Err(ShapeError::BinCountMismatch {
            expected: expected as usize,
            got: model.n_bins(),
        }
        .into());
    }
    path.predict_proba(x_test, model)
}
