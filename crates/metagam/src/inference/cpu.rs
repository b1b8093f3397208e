//! Binned-lookup inference on the host.

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, Zip};
use tracing::debug;

use super::path::AdditivePredict;
use super::transform::TemperedSoftmax;
use crate::device::Device;
use crate::error::{Error, Result, ShapeError};
use crate::model::AdditiveModel;
use crate::utils::Parallelism;

/// CPU predictor for [`AdditiveModel`]s.
///
/// Per row: look up each feature's bin, sum the bin contributions, add the
/// bias and apply the tempered softmax.
///
/// Missing test values are replaced by `0.0` before lookup. This is a
/// compatibility convention, not a statistically principled imputation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuPredictor {
    softmax: TemperedSoftmax,
    parallelism: Parallelism,
}

impl CpuPredictor {
    pub fn new(temperature: f32, parallelism: Parallelism) -> Self {
        Self {
            softmax: TemperedSoftmax::new(temperature),
            parallelism,
        }
    }

    /// Raw class scores (bias plus summed contributions), `[n_rows, n_classes]`.
    ///
    /// # Errors
    ///
    /// [`ShapeError::FeatureCountMismatch`] if `x` has a different number of
    /// columns than the model.
    pub fn scores(
        &self,
        x: ArrayView2<'_, f32>,
        model: &AdditiveModel,
    ) -> std::result::Result<Array2<f32>, ShapeError> {
        if x.ncols() != model.n_features() {
            return Err(ShapeError::FeatureCountMismatch {
                expected: model.n_features(),
                got: x.ncols(),
            });
        }

        let mut out = Array2::zeros((x.nrows(), model.n_classes()));
        let zip = Zip::from(out.rows_mut()).and(x.rows());
        match self.parallelism {
            Parallelism::Sequential => zip.for_each(|out_row, x_row| accumulate_row(model, x_row, out_row)),
            Parallelism::Parallel => zip.par_for_each(|out_row, x_row| accumulate_row(model, x_row, out_row)),
        }
        Ok(out)
    }
}

impl Default for CpuPredictor {
    fn default() -> Self {
        Self {
            softmax: TemperedSoftmax::default(),
            parallelism: Parallelism::Sequential,
        }
    }
}

impl AdditivePredict for CpuPredictor {
    fn device(&self) -> Device {
        Device::Cpu
    }

    fn predict_proba(&self, x: ArrayView2<'_, f32>, model: &AdditiveModel) -> Result<Array2<f32>> {
        let n_missing = x.iter().filter(|v| v.is_nan()).count();
        if n_missing > 0 {
            debug!(n_missing, "zero-filled missing test values");
        }

        let mut probs = self.scores(x, model)?;
        self.softmax.transform_inplace(probs.view_mut());

        if let Some(row) = probs
            .rows()
            .into_iter()
            .position(|row| row.iter().any(|p| !p.is_finite()))
        {
            return Err(Error::NonFiniteOutput { row });
        }
        Ok(probs)
    }
}

/// Sum the bin contributions of one row into `out`, then add the biases.
#[inline]
fn accumulate_row(model: &AdditiveModel, x_row: ArrayView1<'_, f32>, mut out: ArrayViewMut1<'_, f32>) {
    let edges = model.bin_edges();
    for (feature, &value) in x_row.iter().enumerate() {
        let value = if value.is_nan() { 0.0 } else { value };
        let bin = edges.bin_index(feature, value);
        out += &model.contribution(feature, bin);
    }
    out += &model.biases();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BinEdges;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array3, array};

    /// 2 features, 3 bins, 2 classes with hand-set contributions.
    fn model() -> AdditiveModel {
        let edges = BinEdges::from_array(array![[0.0, 1.0], [10.0, 20.0]]).unwrap();
        let mut weights = Array3::zeros((2, 3, 2));
        // feature 0: bin b favours class 0 by b
        for b in 0..3 {
            weights[[0, b, 0]] = b as f32;
        }
        // feature 1: bin 2 strongly favours class 1
        weights[[1, 2, 1]] = 5.0;
        AdditiveModel::new(weights, array![0.25, -0.25], edges, Device::Cpu).unwrap()
    }

    #[test]
    fn scores_sum_contributions_and_bias() {
        let x = array![[0.5f32, 15.0], [2.0, 25.0], [-1.0, 10.0]];
        let scores = CpuPredictor::default().scores(x.view(), &model()).unwrap();

        // row 0: f0 bin 1, f1 bin 1
        assert_abs_diff_eq!(scores[[0, 0]], 1.25);
        assert_abs_diff_eq!(scores[[0, 1]], -0.25);
        // row 1: f0 bin 2, f1 bin 2
        assert_abs_diff_eq!(scores[[1, 0]], 2.25);
        assert_abs_diff_eq!(scores[[1, 1]], 4.75);
        // row 2: f0 bin 0, f1 bin 0 (value equal to first edge)
        assert_abs_diff_eq!(scores[[2, 0]], 0.25);
        assert_abs_diff_eq!(scores[[2, 1]], -0.25);
    }

    #[test]
    fn predict_proba_applies_tempered_softmax() {
        let x = array![[0.5f32, 15.0]];
        let probs = CpuPredictor::default().predict_proba(x.view(), &model()).unwrap();

        let z = (1.25f32 - -0.25) / 0.8;
        assert_abs_diff_eq!(probs[[0, 0]], 1.0 / (1.0 + (-z).exp()), epsilon = 1e-6);
        assert_abs_diff_eq!(probs.row(0).sum(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn missing_values_are_zero_filled() {
        let with_nan = array![[f32::NAN, 15.0]];
        let with_zero = array![[0.0f32, 15.0]];
        let predictor = CpuPredictor::default();

        let a = predictor.predict_proba(with_nan.view(), &model()).unwrap();
        let b = predictor.predict_proba(with_zero.view(), &model()).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn non_finite_weights_are_internal_errors() {
        let (mut weights, biases, edges) = model().into_parts();
        weights[[1, 2, 0]] = f32::NAN;
        let broken = AdditiveModel::new(weights, biases, edges, Device::Cpu).unwrap();

        let x = array![[0.5f32, 15.0], [0.5, 25.0]];
        let err = CpuPredictor::default().predict_proba(x.view(), &broken).unwrap_err();
        assert_eq!(err, Error::NonFiniteOutput { row: 1 });
        assert!(err.is_internal());
    }

    #[test]
    fn feature_count_must_match() {
        let x = array![[0.5f32, 15.0, 3.0]];
        let err = CpuPredictor::default().predict_proba(x.view(), &model()).unwrap_err();
        assert_eq!(err, Error::Shape(ShapeError::FeatureCountMismatch { expected: 2, got: 3 }));
    }

    #[test]
    fn parallel_matches_sequential() {
        let x = Array2::from_shape_fn((64, 2), |(r, c)| (r as f32 - 20.0) * if c == 0 { 0.1 } else { 1.0 });
        let seq = CpuPredictor::new(0.8, Parallelism::Sequential)
            .predict_proba(x.view(), &model())
            .unwrap();
        let par = CpuPredictor::new(0.8, Parallelism::Parallel)
            .predict_proba(x.view(), &model())
            .unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let x = Array2::<f32>::zeros((0, 2));
        let probs = CpuPredictor::default().predict_proba(x.view(), &model()).unwrap();
        assert_eq!(probs.dim(), (0, 2));
    }
}
