use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3};

use crate::model::{DecodedWeights, MetaTransformer, ModelMeta};

/// Deterministic stand-in for a trained meta-transformer.
///
/// Embeddings are plain indicators: the feature encoder flattens the
/// one-hot bins into the first `max_features * n_bins` slots, the label
/// encoder sets slot `max_features * n_bins + label`. Attention is the
/// identity. The decoder counts bins per class and emits smoothed
/// naive-Bayes log-likelihoods:
///
/// ```text
/// weights[f, b, c] = ln((count(f, b, c) + a) / (count(c) + a * n_bins))
/// biases[c]        = ln((count(c) + a) / (n_rows + a * max_classes))
/// ```
///
/// so the extracted model is a binned naive-Bayes classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CountingTransformer {
    meta: ModelMeta,
    smoothing: f32,
}

impl CountingTransformer {
    /// Additive model with `n_bins` bins, `max_classes` class slots and the
    /// default feature width.
    pub fn new(n_bins: u32, max_classes: usize) -> Self {
        Self::with_meta(ModelMeta::additive(n_bins, max_classes))
    }

    pub fn with_meta(meta: ModelMeta) -> Self {
        Self { meta, smoothing: 1.0 }
    }

    /// Laplace smoothing constant. Default: 1.
    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing;
        self
    }

    fn n_bins(&self) -> usize {
        self.meta.n_bins as usize
    }

    fn feature_slots(&self) -> usize {
        self.meta.max_features * self.n_bins()
    }

    fn embed_dim(&self) -> usize {
        self.feature_slots() + self.meta.max_classes
    }
}

impl MetaTransformer for CountingTransformer {
    fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn encode_features(&self, one_hot: ArrayView3<'_, f32>) -> Array2<f32> {
        let (n_rows, width, n_bins) = one_hot.dim();
        let mut out = Array2::zeros((n_rows, self.embed_dim()));
        let width = width.min(self.meta.max_features);
        let n_bins = n_bins.min(self.n_bins());
        for ((r, f, b), &v) in one_hot.indexed_iter() {
            if f < width && b < n_bins {
                out[[r, f * self.n_bins() + b]] = v;
            }
        }
        out
    }

    fn encode_labels(&self, labels: ArrayView1<'_, f32>) -> Array2<f32> {
        let mut out = Array2::zeros((labels.len(), self.embed_dim()));
        for (r, &label) in labels.iter().enumerate() {
            let class = label as usize;
            if class < self.meta.max_classes {
                out[[r, self.feature_slots() + class]] = 1.0;
            }
        }
        out
    }

    fn attend(&self, tokens: ArrayView2<'_, f32>) -> Array2<f32> {
        tokens.to_owned()
    }

    fn decode(&self, hidden: ArrayView2<'_, f32>, labels: ArrayView1<'_, f32>) -> DecodedWeights {
        let (width, n_bins, max_classes) = (self.meta.max_features, self.n_bins(), self.meta.max_classes);
        let a = self.smoothing;

        let mut bin_counts = Array3::<f32>::zeros((width, n_bins, max_classes));
        let mut class_counts = Array1::<f32>::zeros(max_classes);
        for (row, &label) in hidden.rows().into_iter().zip(labels) {
            let class = label as usize;
            if class >= max_classes {
                continue;
            }
            class_counts[class] += 1.0;
            for f in 0..width {
                for b in 0..n_bins {
                    bin_counts[[f, b, class]] += row[f * n_bins + b];
                }
            }
        }

        let n_rows = labels.len() as f32;
        let weights = Array3::from_shape_fn((width, n_bins, max_classes), |(f, b, c)| {
            ((bin_counts[[f, b, c]] + a) / (class_counts[c] + a * n_bins as f32)).ln()
        });
        let biases = class_counts.mapv(|n| ((n + a) / (n_rows + a * max_classes as f32)).ln());
        DecodedWeights { weights, biases }
    }
}
