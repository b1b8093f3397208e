//! Fit/predict wrapper around extraction and inference.
//!
//! [`AdditiveClassifier`] holds a frozen meta-transformer and a config.
//! [`fit`](AdditiveClassifier::fit) encodes the labels, extracts an
//! [`AdditiveModel`] and returns a [`FittedAdditiveClassifier`] that predicts
//! without touching the transformer again.

use ndarray::{Array2, ArrayView2};
use tracing::debug;

use super::additive::AdditiveModel;
use super::config::AdditiveConfig;
use super::labels::LabelEncoder;
use super::transformer::MetaTransformer;
use crate::error::Result;
use crate::extract::extract;
use crate::inference::{InferencePath, predict_with};

/// Unfitted classifier.
#[derive(Debug, Clone)]
pub struct AdditiveClassifier<M> {
    model: M,
    config: AdditiveConfig,
}

impl<M: MetaTransformer> AdditiveClassifier<M> {
    pub fn new(model: M, config: AdditiveConfig) -> Self {
        Self { model, config }
    }

    #[inline]
    pub fn model(&self) -> &M {
        &self.model
    }

    #[inline]
    pub fn config(&self) -> &AdditiveConfig {
        &self.config
    }

    /// Extract an additive model from `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::IncompatibleModelType`](crate::ConfigError::IncompatibleModelType)
    /// if the transformer is not an additive model, otherwise anything
    /// [`extract`] returns.
    pub fn fit<L: Ord + Clone>(&self, x: ArrayView2<'_, f32>, y: &[L]) -> Result<FittedAdditiveClassifier<L>> {
        self.model.meta().ensure_additive()?;

        let (labels, codes) = LabelEncoder::fit_transform(y);
        let artifact = extract(&self.model, x, codes.view(), &self.config)?;
        let path = InferencePath::new(x, &self.config);
        debug!(n_classes = labels.n_classes(), n_rows = x.nrows(), "fitted additive classifier");

        Ok(FittedAdditiveClassifier {
            artifact,
            labels,
            x_train: x.to_owned(),
            path,
            config: self.config.clone(),
        })
    }
}

/// Classifier with an extracted artifact.
#[derive(Debug, Clone)]
pub struct FittedAdditiveClassifier<L> {
    artifact: AdditiveModel,
    labels: LabelEncoder<L>,
    x_train: Array2<f32>,
    path: InferencePath,
    config: AdditiveConfig,
}

impl<L: Ord + Clone> FittedAdditiveClassifier<L> {
    /// The extracted additive model.
    #[inline]
    pub fn artifact(&self) -> &AdditiveModel {
        &self.artifact
    }

    /// Labels in class-code order; column `i` of
    /// [`predict_proba`](Self::predict_proba) belongs to `classes()[i]`.
    #[inline]
    pub fn classes(&self) -> &[L] {
        self.labels.classes()
    }

    #[inline]
    pub fn label_encoder(&self) -> &LabelEncoder<L> {
        &self.labels
    }

    /// Training features the artifact was extracted from.
    #[inline]
    pub fn x_train(&self) -> ArrayView2<'_, f32> {
        self.x_train.view()
    }

    #[inline]
    pub fn config(&self) -> &AdditiveConfig {
        &self.config
    }

    /// Class probabilities, `[n_rows, n_classes]`.
    pub fn predict_proba(&self, x: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
        predict_with(&self.path, x, &self.artifact, &self.config)
    }

    /// Most probable label per row. Ties go to the smallest class code.
    pub fn predict(&self, x: ArrayView2<'_, f32>) -> Result<Vec<L>> {
        let probs = self.predict_proba(x)?;
        Ok(probs
            .rows()
            .into_iter()
            .map(|row| {
                let best = row
                    .iter()
                    .enumerate()
                    .fold((0, f32::NEG_INFINITY), |best, (i, &p)| if p > best.1 { (i, p) } else { best })
                    .0;
                self.labels.classes()[best].clone()
            })
            .collect())
    }
}
