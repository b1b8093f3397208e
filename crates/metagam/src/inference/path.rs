//! Inference path selection.

use ndarray::{Array2, ArrayView2};
use tracing::debug;

use super::accelerator::AcceleratorPredictor;
use super::cpu::CpuPredictor;
use crate::device::Device;
use crate::error::Result;
use crate::model::{AdditiveConfig, AdditiveModel};

/// Turns test features into class probabilities with an extracted model.
pub trait AdditivePredict {
    /// Device this predictor evaluates on.
    fn device(&self) -> Device;

    /// Class probabilities `[n_rows, n_classes]`; each row sums to 1.
    fn predict_proba(&self, x: ArrayView2<'_, f32>, model: &AdditiveModel) -> Result<Array2<f32>>;
}

/// Predictor chosen from `inference_device`.
#[derive(Debug, Clone, PartialEq)]
pub enum InferencePath {
    Cpu(CpuPredictor),
    Accelerator(AcceleratorPredictor),
}

impl InferencePath {
    /// Select and prepare the predictor for `config.inference_device`.
    ///
    /// The accelerator path keeps training-feature statistics, so it needs
    /// `x_train`. The CPU path ignores it.
    pub fn new(x_train: ArrayView2<'_, f32>, config: &AdditiveConfig) -> Self {
        match config.inference_device {
            Device::Cpu => {
                debug!("using cpu inference path");
                Self::Cpu(CpuPredictor::new(config.temperature, config.parallelism))
            }
            device @ Device::Cuda { .. } => Self::Accelerator(AcceleratorPredictor::new(device, x_train)),
        }
    }
}

impl AdditivePredict for InferencePath {
    fn device(&self) -> Device {
        match self {
            Self::Cpu(p) => p.device(),
            Self::Accelerator(p) => p.device(),
        }
    }

    fn predict_proba(&self, x: ArrayView2<'_, f32>, model: &AdditiveModel) -> Result<Array2<f32>> {
        match self {
            Self::Cpu(p) => p.predict_proba(x, model),
            Self::Accelerator(p) => p.predict_proba(x, model),
        }
    }
}
