//! Quantile binning and one-hot bin encoding.

use bon::Builder;
use ndarray::{Array2, Array3, ArrayView2, s};
use tracing::{debug, trace};

use super::edges::BinEdges;
use crate::error::{ConfigError, Result, ShapeError};
use crate::utils::{Parallelism, linear_quantile};
use crate::{DEFAULT_N_BINS, MAX_FEATURES};

// =============================================================================
// Binning Configuration
// =============================================================================

/// Configuration for feature binning.
///
/// # Example
///
/// ```
/// use metagam::data::BinningConfig;
///
/// // Just the bin count
/// let config = BinningConfig::from(32);
///
/// // Full control
/// let config = BinningConfig::builder()
///     .n_bins(32)
///     .width(100)
///     .parallelism(metagam::Parallelism::Parallel)
///     .build();
/// assert_eq!(config.n_bins, 32);
/// ```
#[derive(Clone, Debug, Builder)]
#[builder(derive(Clone, Debug))]
pub struct BinningConfig {
    /// Bins per feature (default: 64).
    #[builder(default = DEFAULT_N_BINS)]
    pub n_bins: u32,
    /// Padded feature width. Inputs narrower than this are zero-padded
    /// (default: 100).
    #[builder(default = MAX_FEATURES)]
    pub width: usize,
    /// Threading for per-feature boundary computation.
    #[builder(default)]
    pub parallelism: Parallelism,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl From<u32> for BinningConfig {
    fn from(n_bins: u32) -> Self {
        Self::builder().n_bins(n_bins).build()
    }
}

/// Output of [`compute_bins`].
#[derive(Debug, Clone)]
pub struct BinnedData {
    /// Bin indicators, shape `[n_rows, width, n_bins]`. Exactly one entry per
    /// (row, feature) is `1.0`.
    pub one_hot: Array3<f32>,
    /// Boundaries for all `width` features (padding included).
    pub edges: BinEdges,
}

/// Pad `x` with zero columns up to `width`.
///
/// # Errors
///
/// [`ShapeError::TooManyFeatures`] if `x` already has more than `width` columns.
pub fn pad_features(x: ArrayView2<'_, f32>, width: usize) -> std::result::Result<Array2<f32>, ShapeError> {
    let (n_rows, n_features) = x.dim();
    if n_features > width {
        return Err(ShapeError::TooManyFeatures { n_features, max: width });
    }
    let mut padded = Array2::zeros((n_rows, width));
    padded.slice_mut(s![.., ..n_features]).assign(&x);
    Ok(padded)
}

/// Compute bin boundaries from `x` and encode `x` against them.
///
/// `x` has shape `[n_rows, n_features]` with `n_features <= config.width`.
/// The returned one-hot tensor covers the padded width, ready to be fed to a
/// feature encoder.
pub fn compute_bins(x: ArrayView2<'_, f32>, config: &BinningConfig) -> Result<BinnedData> {
    QuantileBinner::new(config.clone()).fit_transform(x)
}

// =============================================================================
// QuantileBinner
// =============================================================================

/// Equal-frequency binner.
///
/// Boundary `k` of a feature is the empirical quantile at level `k / n_bins`
/// of that feature in the reference data, so each bin receives a comparable
/// share of reference rows when there are no ties. Missing reference values
/// count as zero.
#[derive(Debug, Clone)]
pub struct QuantileBinner {
    config: BinningConfig,
}

impl QuantileBinner {
    pub fn new(config: BinningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BinningConfig {
        &self.config
    }

    /// Compute boundaries for every padded feature of `x`.
    pub fn fit(&self, x: ArrayView2<'_, f32>) -> Result<BinEdges> {
        self.validate()?;
        let padded = self.pad_checked(x)?;
        Ok(self.fit_padded(padded.view()))
    }

    /// One-hot encode `x` against `edges`.
    pub fn transform(&self, x: ArrayView2<'_, f32>, edges: &BinEdges) -> Result<Array3<f32>> {
        self.validate()?;
        let padded = pad_features(x, self.config.width)?;
        if edges.n_features() != self.config.width {
            return Err(ShapeError::FeatureCountMismatch {
                expected: self.config.width,
                got: edges.n_features(),
            }
            .into());
        }
        if edges.n_bins() != self.config.n_bins as usize {
            return Err(ShapeError::BinCountMismatch {
                expected: self.config.n_bins as usize,
                got: edges.n_bins(),
            }
            .into());
        }
        Ok(one_hot(padded.view(), edges))
    }

    /// Fit boundaries on `x` and encode `x` in one pass.
    pub fn fit_transform(&self, x: ArrayView2<'_, f32>) -> Result<BinnedData> {
        self.validate()?;
        let padded = self.pad_checked(x)?;
        let edges = self.fit_padded(padded.view());
        let one_hot = one_hot(padded.view(), &edges);
        debug!(
            n_rows = padded.nrows(),
            n_features = x.ncols(),
            width = self.config.width,
            n_bins = self.config.n_bins,
            "computed quantile bins"
        );
        Ok(BinnedData { one_hot, edges })
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.config.n_bins < 2 {
            return Err(ConfigError::InvalidNBins(self.config.n_bins));
        }
        Ok(())
    }

    fn pad_checked(&self, x: ArrayView2<'_, f32>) -> std::result::Result<Array2<f32>, ShapeError> {
        if x.nrows() == 0 {
            return Err(ShapeError::EmptyDataset);
        }
        pad_features(x, self.config.width)
    }

    fn fit_padded(&self, padded: ArrayView2<'_, f32>) -> BinEdges {
        let n_bins = self.config.n_bins as usize;
        let width = padded.ncols();

        let rows = self
            .config
            .parallelism
            .maybe_par_map(0..width, |feature| {
                let mut values: Vec<f64> = padded
                    .column(feature)
                    .iter()
                    .map(|&v| if v.is_nan() { 0.0 } else { v as f64 })
                    .collect();
                Self::quantile_bounds(&mut values, n_bins)
            });

        let mut edges = Array2::zeros((width, n_bins - 1));
        for (feature, bounds) in rows.into_iter().enumerate() {
            edges.row_mut(feature).assign(&ndarray::ArrayView1::from(&bounds[..]));
        }
        trace!(width, n_bins, "fitted bin edges");
        BinEdges::from_sorted(edges)
    }

    /// Interior quantile boundaries of one feature.
    ///
    /// Returns `n_bins - 1` non-decreasing values. A constant feature yields
    /// identical boundaries.
    fn quantile_bounds(values: &mut [f64], n_bins: usize) -> Vec<f32> {
        values.sort_by(f64::total_cmp);

        let mut bounds = Vec::with_capacity(n_bins - 1);
        let mut last = f32::NEG_INFINITY;
        for k in 1..n_bins {
            let q = k as f64 / n_bins as f64;
            // Interpolation can round below the previous boundary.
            let bound = (linear_quantile(values, q) as f32).max(last);
            bounds.push(bound);
            last = bound;
        }
        bounds
    }
}

/// Bin-indicator encoding of an already padded matrix.
fn one_hot(padded: ArrayView2<'_, f32>, edges: &BinEdges) -> Array3<f32> {
    let (n_rows, width) = padded.dim();
    let mut out = Array3::zeros((n_rows, width, edges.n_bins()));
    for ((row, feature), &value) in padded.indexed_iter() {
        let value = if value.is_nan() { 0.0 } else { value };
        out[[row, feature, edges.bin_index(feature, value)]] = 1.0;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array, Axis, array};

    fn column(values: &[f32]) -> Array2<f32> {
        Array::from_shape_vec((values.len(), 1), values.to_vec()).unwrap()
    }

    #[test]
    fn pad_features_appends_zeros() {
        let x = array![[1.0f32, 2.0], [3.0, 4.0]];
        let padded = pad_features(x.view(), 4).unwrap();
        assert_eq!(padded, array![[1.0, 2.0, 0.0, 0.0], [3.0, 4.0, 0.0, 0.0]]);
    }

    #[test]
    fn pad_features_rejects_wide_input() {
        let x = Array2::<f32>::zeros((3, 101));
        let err = pad_features(x.view(), MAX_FEATURES).unwrap_err();
        assert_eq!(err, ShapeError::TooManyFeatures { n_features: 101, max: 100 });
    }

    #[test]
    fn quantile_edges_uniform_column() {
        let x = column(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let config = BinningConfig::builder().n_bins(4).width(1).build();
        let edges = QuantileBinner::new(config).fit(x.view()).unwrap();

        assert_eq!(edges.n_features(), 1);
        assert_eq!(edges.n_bins(), 4);
        let e = edges.feature(0);
        assert_abs_diff_eq!(e[0], 2.0);
        assert_abs_diff_eq!(e[1], 4.0);
        assert_abs_diff_eq!(e[2], 6.0);
    }

    #[test]
    fn quantile_edges_interpolate() {
        let x = column(&[0.0, 10.0]);
        let config = BinningConfig::builder().n_bins(4).width(1).build();
        let edges = QuantileBinner::new(config).fit(x.view()).unwrap();
        assert_eq!(edges.feature(0).to_vec(), vec![2.5, 5.0, 7.5]);
    }

    #[test]
    fn compute_bins_shapes() {
        let x = array![[0.0f32, 1.0, 5.0], [1.0, 2.0, 5.0], [2.0, 3.0, 5.0], [3.0, 4.0, 5.0]];
        let binned = compute_bins(x.view(), &BinningConfig::from(8)).unwrap();

        assert_eq!(binned.one_hot.dim(), (4, MAX_FEATURES, 8));
        assert_eq!(binned.edges.n_features(), MAX_FEATURES);
        assert_eq!(binned.edges.n_bins(), 8);
    }

    #[test]
    fn one_hot_has_single_indicator_per_feature() {
        let x = array![[0.3f32, -1.0], [2.0, 7.5], [f32::NAN, 0.0], [9.0, 3.0]];
        let binned = compute_bins(x.view(), &BinningConfig::from(3)).unwrap();

        for row in binned.one_hot.axis_iter(Axis(0)) {
            for feature in row.axis_iter(Axis(0)) {
                assert_eq!(feature.sum(), 1.0);
                assert_eq!(feature.iter().filter(|&&v| v == 1.0).count(), 1);
            }
        }
    }

    #[test]
    fn constant_column_uses_single_bin() {
        let x = column(&[3.0; 10]);
        let config = BinningConfig::builder().n_bins(5).width(2).build();
        let binned = compute_bins(x.view(), &config).unwrap();

        assert!(binned.edges.feature(0).iter().all(|&e| e == 3.0));
        for row in 0..10 {
            assert_eq!(binned.one_hot[[row, 0, 0]], 1.0);
            // Padding column is constant zero as well.
            assert_eq!(binned.one_hot[[row, 1, 0]], 1.0);
        }
    }

    #[test]
    fn infinite_reference_values_keep_their_edges() {
        let x = array![
            [f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY],
            [f32::INFINITY, f32::NEG_INFINITY, 1.0],
            [f32::INFINITY, f32::NEG_INFINITY, f32::INFINITY],
            [f32::INFINITY, f32::NEG_INFINITY, f32::INFINITY],
        ];
        let config = BinningConfig::builder().n_bins(4).width(3).build();
        let edges = QuantileBinner::new(config).fit(x.view()).unwrap();

        assert!(edges.feature(0).iter().all(|&e| e == f32::INFINITY));
        assert!(edges.feature(1).iter().all(|&e| e == f32::NEG_INFINITY));
        // [-inf, 1, inf, inf] at q = 1/4, 1/2, 3/4
        assert_eq!(edges.feature(2).to_vec(), vec![f32::NEG_INFINITY, f32::INFINITY, f32::INFINITY]);
        assert!(edges.view().iter().all(|e| !e.is_nan()));
    }

    #[test]
    fn missing_reference_values_count_as_zero() {
        let with_nan = column(&[f32::NAN, 1.0, 2.0, 3.0]);
        let with_zero = column(&[0.0, 1.0, 2.0, 3.0]);
        let config = BinningConfig::builder().n_bins(4).width(1).build();
        let binner = QuantileBinner::new(config);

        assert_eq!(binner.fit(with_nan.view()).unwrap(), binner.fit(with_zero.view()).unwrap());
    }

    #[test]
    fn edges_are_non_decreasing_with_ties() {
        let x = column(&[1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 9.0, 9.0, 9.0, 100.0]);
        let config = BinningConfig::builder().n_bins(16).width(1).build();
        let edges = QuantileBinner::new(config).fit(x.view()).unwrap();
        let e = edges.feature(0);
        for w in e.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let x = Array::from_shape_fn((50, 7), |(r, c)| ((r * 31 + c * 17) % 23) as f32 - 4.0);
        let seq = compute_bins(x.view(), &BinningConfig::from(10)).unwrap();
        let par_config = BinningConfig::builder()
            .n_bins(10)
            .parallelism(Parallelism::Parallel)
            .build();
        let par = compute_bins(x.view(), &par_config).unwrap();

        assert_eq!(seq.edges, par.edges);
        assert_eq!(seq.one_hot, par.one_hot);
    }

    #[test]
    fn transform_reuses_frozen_edges() {
        let train = column(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let config = BinningConfig::builder().n_bins(4).width(1).build();
        let binner = QuantileBinner::new(config);
        let edges = binner.fit(train.view()).unwrap();

        let test = column(&[-5.0, 3.0, 100.0]);
        let encoded = binner.transform(test.view(), &edges).unwrap();
        assert_eq!(encoded[[0, 0, 0]], 1.0);
        assert_eq!(encoded[[1, 0, 1]], 1.0);
        assert_eq!(encoded[[2, 0, 3]], 1.0);
    }

    #[test]
    fn rejects_invalid_input() {
        let empty = Array2::<f32>::zeros((0, 3));
        assert!(matches!(
            compute_bins(empty.view(), &BinningConfig::default()),
            Err(crate::Error::Shape(ShapeError::EmptyDataset))
        ));

        let x = column(&[1.0, 2.0]);
        assert!(matches!(
            compute_bins(x.view(), &BinningConfig::from(1)),
            Err(crate::Error::Config(ConfigError::InvalidNBins(1)))
        ));
    }

    #[test]
    fn config_defaults() {
        let config = BinningConfig::default();
        assert_eq!(config.n_bins, DEFAULT_N_BINS);
        assert_eq!(config.width, MAX_FEATURES);
        assert_eq!(config.parallelism, Parallelism::Sequential);
    }
}
