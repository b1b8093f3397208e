//! Per-feature bin boundaries.

use ndarray::{Array2, ArrayView1, ArrayView2, s};
use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

/// Frozen bin boundaries, shape `[n_features, n_bins - 1]`.
///
/// Row `f` partitions the real line into `n_bins` intervals for feature `f`.
/// Boundaries are non-decreasing along each row; repeated boundaries (from
/// ties in the reference data) produce empty bins.
///
/// ```text
/// bin 0: (-inf, e0]   bin 1: (e0, e1]   ...   bin n_bins-1: (e_last, +inf)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Array2<f32>", into = "Array2<f32>")]
pub struct BinEdges {
    edges: Array2<f32>,
}

impl BinEdges {
    /// Wrap a boundary matrix, checking that every row is non-decreasing.
    pub fn from_array(edges: Array2<f32>) -> Result<Self, ShapeError> {
        let edges = edges.as_standard_layout().into_owned();
        for (feature, row) in edges.outer_iter().enumerate() {
            if row.iter().any(|e| e.is_nan()) {
                return Err(ShapeError::InconsistentArtifact(format!(
                    "bin edges of feature {} contain NaN",
                    feature
                )));
            }
            if !is_non_decreasing(row) {
                return Err(ShapeError::InconsistentArtifact(format!(
                    "bin edges of feature {} are not sorted",
                    feature
                )));
            }
        }
        Ok(Self { edges })
    }

    /// Construct without validation. Callers guarantee sorted rows.
    pub(crate) fn from_sorted(edges: Array2<f32>) -> Self {
        debug_assert!(edges.outer_iter().all(is_non_decreasing));
        Self { edges }
    }

    /// Number of features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.edges.nrows()
    }

    /// Number of bins per feature (boundaries + 1).
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.edges.ncols() + 1
    }

    /// Boundaries of one feature.
    #[inline]
    pub fn feature(&self, feature: usize) -> ArrayView1<'_, f32> {
        self.edges.row(feature)
    }

    /// All boundaries as `[n_features, n_bins - 1]`.
    #[inline]
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.edges.view()
    }

    /// Consume into the raw boundary matrix.
    pub fn into_array(self) -> Array2<f32> {
        self.edges
    }

    /// Bin index of `value` for `feature`.
    ///
    /// Returns the number of boundaries strictly less than `value`, so a value
    /// equal to a boundary falls in the bin that boundary closes.
    #[inline]
    pub fn bin_index(&self, feature: usize, value: f32) -> usize {
        searchsorted_left(self.edges.row(feature), value)
    }

    /// Keep only the first `n_features` rows.
    pub fn truncate(&self, n_features: usize) -> Self {
        let n = n_features.min(self.n_features());
        Self {
            edges: self.edges.slice(s![..n, ..]).to_owned(),
        }
    }
}

impl TryFrom<Array2<f32>> for BinEdges {
    type Error = ShapeError;

    fn try_from(edges: Array2<f32>) -> Result<Self, Self::Error> {
        Self::from_array(edges)
    }
}

impl From<BinEdges> for Array2<f32> {
    fn from(edges: BinEdges) -> Self {
        edges.into_array()
    }
}

/// Insertion index keeping `edges` sorted, left side.
#[inline]
fn searchsorted_left(edges: ArrayView1<'_, f32>, value: f32) -> usize {
    let (mut lo, mut hi) = (0, edges.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if edges[mid] < value {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

fn is_non_decreasing(row: ArrayView1<'_, f32>) -> bool {
    row.windows(2).into_iter().all(|w| w[0] <= w[1])
}
