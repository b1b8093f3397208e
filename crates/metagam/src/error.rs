//! Error types for extraction and inference.
//!
//! Input problems are split into [`ShapeError`] (array extents and label
//! ranges) and [`ConfigError`] (devices, model type, parameter values).
//! Both are fatal to the current call and never retried. [`Error`] adds the
//! internal-consistency failure raised when a pipeline produces non-finite
//! probabilities, and the unsupported accelerator path.

use crate::device::Device;

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Array shape or label-range violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// More features than the architecture accepts.
    #[error("cannot process data with {n_features} features, the maximum is {max}")]
    TooManyFeatures { n_features: usize, max: usize },

    /// Dataset has no rows.
    #[error("dataset has no rows")]
    EmptyDataset,

    /// Label vector length differs from the number of rows.
    #[error("expected {expected} labels, got {got}")]
    LabelCountMismatch { expected: usize, got: usize },

    /// Labels are not contiguous integers `[0, n_classes)`.
    #[error("label {label} is outside [0, {n_classes}); labels must be encoded contiguously")]
    NonContiguousLabels { label: u32, n_classes: usize },

    /// More distinct classes than the model's decoder emits.
    #[error("cannot process data with {n_classes} classes, the model supports at most {max}")]
    TooManyClasses { n_classes: usize, max: usize },

    /// Input column count differs from the fitted artifact.
    #[error("expected {expected} features, got {got}")]
    FeatureCountMismatch { expected: usize, got: usize },

    /// Bin count differs from the expected value.
    #[error("expected {expected} bins per feature, got {got}")]
    BinCountMismatch { expected: usize, got: usize },

    /// A meta-transformer stage returned an array of unexpected shape.
    #[error("{stage} returned shape {got:?}, expected {expected:?}")]
    SubmoduleOutput {
        stage: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// Artifact components disagree with each other.
    #[error("inconsistent artifact: {0}")]
    InconsistentArtifact(String),
}

/// Configuration or precondition violation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Accelerator inference requested against a CPU-hosted model.
    #[error("cannot run inference on {inference_device} when the model is on cpu")]
    AcceleratorOnCpuModel { inference_device: Device },

    /// Device string not recognized.
    #[error("unknown inference device: {0:?}")]
    UnknownDevice(String),

    /// Model checkpoint is not an additive meta-transformer.
    #[error("incompatible model_type: {0}")]
    IncompatibleModelType(String),

    /// Prediction requested on a device other than where the artifact lives.
    #[error("artifact is resident on {artifact}, cannot predict on {requested}")]
    ArtifactDeviceMismatch { artifact: Device, requested: Device },

    /// Bin count must be at least 2.
    #[error("n_bins must be >= 2, got {0}")]
    InvalidNBins(u32),

    /// Softmax temperature must be finite and positive.
    #[error("temperature must be finite and > 0, got {0}")]
    InvalidTemperature(f32),

    /// Feature ceiling outside `1..=MAX_FEATURES`.
    #[error("max_features must be in 1..={max}, got {got}")]
    InvalidMaxFeatures { got: usize, max: usize },
}

/// Top-level error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Non-finite probabilities after inference. Indicates a defect in the
    /// extracted weights or bin edges, not bad input.
    #[error("internal consistency error: non-finite probability in output row {row}")]
    NonFiniteOutput { row: usize },

    /// The accelerator inference path is not available.
    #[error("unsupported device path: binned inference on {device} is not implemented")]
    UnsupportedDevicePath { device: Device },
}

impl Error {
    /// Returns `true` for errors caused by caller input (shape or config).
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Shape(_) | Error::Config(_))
    }

    /// Returns `true` for internal-consistency failures.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::NonFiniteOutput { .. })
    }
}
