//! Compiled additive model.

use ndarray::{Array1, Array3, ArrayView1, ArrayView2, ArrayView3, s};
use serde::{Deserialize, Serialize};

use crate::data::BinEdges;
use crate::device::Device;
use crate::error::ShapeError;

/// Immutable additive classifier extracted from a meta-transformer.
///
/// The score of class `c` for a row `x` is
///
/// ```text
/// score[c] = bias[c] + sum_f weights[f, bin_f(x[f]), c]
/// ```
///
/// where `bin_f` looks up the bin of feature `f` in [`bin_edges`](Self::bin_edges).
/// Each `weights[f, .., ..]` slice is therefore a piecewise-constant shape
/// function of feature `f`.
///
/// The artifact never references the transformer it came from. It is
/// `Send + Sync` and can be shared read-only across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AdditiveModelParts")]
pub struct AdditiveModel {
    /// `[n_features, n_bins, n_classes]`
    weights: Array3<f32>,
    /// `[n_classes]`
    biases: Array1<f32>,
    /// `[n_features, n_bins - 1]`
    bin_edges: BinEdges,
    /// Residency recorded at extraction.
    device: Device,
}

#[derive(Deserialize)]
struct AdditiveModelParts {
    weights: Array3<f32>,
    biases: Array1<f32>,
    bin_edges: BinEdges,
    #[serde(default)]
    device: Device,
}

impl TryFrom<AdditiveModelParts> for AdditiveModel {
    type Error = ShapeError;

    fn try_from(parts: AdditiveModelParts) -> Result<Self, Self::Error> {
        Self::new(parts.weights, parts.biases, parts.bin_edges, parts.device)
    }
}

impl AdditiveModel {
    /// Assemble an artifact, checking that the three arrays agree.
    ///
    /// # Errors
    ///
    /// [`ShapeError::InconsistentArtifact`] if the class count of `weights`
    /// and `biases` differ, if `bin_edges` covers a different number of
    /// features or bins than `weights`, or if there are no classes.
    pub fn new(
        weights: Array3<f32>,
        biases: Array1<f32>,
        bin_edges: BinEdges,
        device: Device,
    ) -> Result<Self, ShapeError> {
        let (n_features, n_bins, n_classes) = weights.dim();
        if n_classes == 0 {
            return Err(ShapeError::InconsistentArtifact("no classes".into()));
        }
        if biases.len() != n_classes {
            return Err(ShapeError::InconsistentArtifact(format!(
                "weights have {} classes but biases have {}",
                n_classes,
                biases.len()
            )));
        }
        if bin_edges.n_features() != n_features {
            return Err(ShapeError::InconsistentArtifact(format!(
                "weights cover {} features but bin edges cover {}",
                n_features,
                bin_edges.n_features()
            )));
        }
        if bin_edges.n_bins() != n_bins {
            return Err(ShapeError::InconsistentArtifact(format!(
                "weights have {} bins but bin edges define {}",
                n_bins,
                bin_edges.n_bins()
            )));
        }
        Ok(Self {
            weights,
            biases,
            bin_edges,
            device,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn n_features(&self) -> usize {
        self.weights.dim().0
    }

    #[inline]
    pub fn n_bins(&self) -> usize {
        self.weights.dim().1
    }

    #[inline]
    pub fn n_classes(&self) -> usize {
        self.weights.dim().2
    }

    /// Per-feature-per-bin class contributions.
    #[inline]
    pub fn weights(&self) -> ArrayView3<'_, f32> {
        self.weights.view()
    }

    /// Class offsets.
    #[inline]
    pub fn biases(&self) -> ArrayView1<'_, f32> {
        self.biases.view()
    }

    #[inline]
    pub fn bin_edges(&self) -> &BinEdges {
        &self.bin_edges
    }

    /// Device the artifact is resident on.
    #[inline]
    pub fn device(&self) -> Device {
        self.device
    }

    /// Class contributions of one bin of one feature.
    #[inline]
    pub fn contribution(&self, feature: usize, bin: usize) -> ArrayView1<'_, f32> {
        self.weights.slice(s![feature, bin, ..])
    }

    /// Shape function of one feature, `[n_bins, n_classes]`.
    pub fn shape_function(&self, feature: usize) -> ArrayView2<'_, f32> {
        self.weights.slice(s![feature, .., ..])
    }

    /// Decompose into `(weights, biases, bin_edges)`.
    pub fn into_parts(self) -> (Array3<f32>, Array1<f32>, BinEdges) {
        (self.weights, self.biases, self.bin_edges)
    }
}
