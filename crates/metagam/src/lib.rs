//! metagam: additive-model extraction from tabular meta-transformers.
//!
//! A meta-transformer trained on synthetic tasks reads a labeled training
//! set in one forward pass and emits the parameters of an additive
//! classifier. This crate turns that output into an explicit model and runs
//! fast binned inference with it, without invoking the transformer again.
//!
//! # Key Types
//!
//! - [`MetaTransformer`] - Contract of the frozen transformer
//! - [`AdditiveModel`] - Extracted `(weights, biases, bin_edges)` artifact
//! - [`AdditiveConfig`] - Feature ceiling, temperature, devices
//! - [`AdditiveClassifier`] - fit/predict wrapper with label encoding
//!
//! # Pipeline
//!
//! 1. [`compute_bins`] - per-feature quantile edges and one-hot bins
//! 2. [`extract`] - one forward pass into an [`AdditiveModel`]
//! 3. [`predict_proba`] - bin lookup, summed contributions, tempered softmax
//!
//! # Logging
//!
//! Extraction and inference emit `tracing` events at debug level. No
//! subscriber is installed by the library.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod data;
pub mod device;
pub mod error;
pub mod extract;
pub mod inference;
pub mod model;
pub mod testing;
pub mod utils;

/// Widest feature matrix the feature encoder accepts.
pub const MAX_FEATURES: usize = 100;

/// Bins per feature of the reference architecture.
pub const DEFAULT_N_BINS: u32 = 64;

/// Softmax temperature applied to summed scores.
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Pipeline entry points
pub use data::compute_bins;
pub use extract::extract;
pub use inference::predict_proba;

// Model types
pub use model::{
    AdditiveClassifier, AdditiveConfig, AdditiveModel, FittedAdditiveClassifier, LabelEncoder,
    MetaTransformer, ModelMeta,
};

// Data types
pub use data::{BinEdges, BinnedData, BinningConfig};

// Errors and placement
pub use device::Device;
pub use error::{ConfigError, Error, Result, ShapeError};

// Shared utilities
pub use utils::Parallelism;
