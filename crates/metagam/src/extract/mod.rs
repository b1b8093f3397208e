//! Additive-model extraction.
//!
//! Turns one forward pass of a frozen [`MetaTransformer`] over a labeled
//! training set into an explicit [`AdditiveModel`]:
//!
//! 1. Pad the training features to the encoder width and bin them.
//! 2. Embed bins and labels, and sum the two token streams.
//! 3. Attend over the whole training set as context.
//! 4. Decode weights and biases sized for the architecture maxima.
//! 5. Truncate to the observed features and classes.
//!
//! The result is a first-order approximation of the transformer's own
//! predictions, not an exact distillation.

use std::collections::BTreeSet;

use ndarray::{ArrayView1, ArrayView2, s};
use tracing::{debug, debug_span};

use crate::data::{BinnedData, BinningConfig, compute_bins};
use crate::error::{ConfigError, Result, ShapeError};
use crate::model::{AdditiveConfig, AdditiveModel, DecodedWeights, MetaTransformer};

/// Extract an additive model from `model` using `(x_train, y_train)` as context.
///
/// `y_train` must hold contiguous class codes `[0, n_classes)`; see
/// [`LabelEncoder`](crate::model::LabelEncoder) for arbitrary labels.
///
/// # Errors
///
/// Preconditions are checked before any array computation:
/// - [`ConfigError::AcceleratorOnCpuModel`] if `config.inference_device` is an
///   accelerator while `config.device` is the CPU
/// - [`ConfigError::InvalidMaxFeatures`] or [`ConfigError::InvalidNBins`] if
///   the model reports an encoder width outside `1..=100` or fewer than 2 bins
/// - [`ShapeError::TooManyFeatures`] if `x_train` is wider than the feature
///   ceiling of the config or the model
/// - [`ShapeError::EmptyDataset`], [`ShapeError::LabelCountMismatch`],
///   [`ShapeError::NonContiguousLabels`], [`ShapeError::TooManyClasses`]
/// - [`ShapeError::BinCountMismatch`] if `config.n_bins` disagrees with the model
///
/// A sub-module returning an unexpected shape yields
/// [`ShapeError::SubmoduleOutput`].
pub fn extract<M: MetaTransformer + ?Sized>(
    model: &M,
    x_train: ArrayView2<'_, f32>,
    y_train: ArrayView1<'_, u32>,
    config: &AdditiveConfig,
) -> Result<AdditiveModel> {
    if config.inference_device.is_accelerator() && config.device.is_cpu() {
        return Err(ConfigError::AcceleratorOnCpuModel {
            inference_device: config.inference_device,
        }
        .into());
    }

    let meta = model.meta();
    meta.validate()?;
    let (n_rows, n_features) = x_train.dim();
    let max_features = config.max_features.min(meta.max_features);
    if n_features > max_features {
        return Err(ShapeError::TooManyFeatures { n_features, max: max_features }.into());
    }
    if n_rows == 0 {
        return Err(ShapeError::EmptyDataset.into());
    }
    if y_train.len() != n_rows {
        return Err(ShapeError::LabelCountMismatch { expected: n_rows, got: y_train.len() }.into());
    }
    let n_classes = count_classes(y_train)?;
    if n_classes > meta.max_classes {
        return Err(ShapeError::TooManyClasses { n_classes, max: meta.max_classes }.into());
    }
    if let Some(expected) = config.n_bins
        && expected != meta.n_bins
    {
        return Err(ShapeError::BinCountMismatch {
            expected: expected as usize,
            got: meta.n_bins as usize,
        }
        .into());
    }

    let _span = debug_span!("extract", n_rows, n_features, n_classes).entered();

    let binning = BinningConfig::builder()
        .n_bins(meta.n_bins)
        .width(meta.max_features)
        .parallelism(config.parallelism)
        .build();
    let BinnedData { one_hot, edges } = compute_bins(x_train, &binning)?;

    let labels = y_train.mapv(|label| label as f32);
    let x_src = model.encode_features(one_hot.view());
    let y_src = model.encode_labels(labels.view());
    let embed_dim = x_src.ncols();
    check_shape("feature encoder", &[n_rows, embed_dim], x_src.shape())?;
    check_shape("label encoder", &[n_rows, embed_dim], y_src.shape())?;

    let tokens = x_src + &y_src;
    let hidden = model.attend(tokens.view());
    check_shape("attention stack", &[n_rows, embed_dim], hidden.shape())?;

    let DecodedWeights { weights, biases } = model.decode(hidden.view(), labels.view());
    let n_bins = meta.n_bins as usize;
    check_shape(
        "decoder weights",
        &[meta.max_features, n_bins, meta.max_classes],
        weights.shape(),
    )?;
    check_shape("decoder biases", &[meta.max_classes], biases.shape())?;

    let weights = weights.slice(s![..n_features, .., ..n_classes]).to_owned();
    let biases = biases.slice(s![..n_classes]).to_owned();
    let edges = edges.truncate(n_features);

    debug!(
        embed_dim,
        n_bins,
        device = %config.inference_device,
        "extracted additive model"
    );

    Ok(AdditiveModel::new(weights, biases, edges, config.inference_device)?)
}

/// Number of distinct labels, requiring them to be `0..n`.
fn count_classes(y: ArrayView1<'_, u32>) -> std::result::Result<usize, ShapeError> {
    let distinct: BTreeSet<u32> = y.iter().copied().collect();
    let n_classes = distinct.len();
    match distinct.last() {
        Some(&label) if label as usize >= n_classes => {
            Err(ShapeError::NonContiguousLabels { label, n_classes })
        }
        _ => Ok(n_classes),
    }
}

fn check_shape(
    stage: &'static str,
    expected: &[usize],
    got: &[usize],
) -> std::result::Result<(), ShapeError> {
    if expected == got {
        Ok(())
    } else {
        Err(ShapeError::SubmoduleOutput {
            stage,
            expected: expected.to_vec(),
            got: got.to_vec(),
        })
    }
}
