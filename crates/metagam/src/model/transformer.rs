//! Capability contract of a frozen meta-transformer.

use std::sync::Arc;

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3};

use super::meta::ModelMeta;

/// Raw decoder output, sized for the architecture maxima.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedWeights {
    /// Per-feature-per-bin class contributions, `[max_features, n_bins, max_classes]`.
    pub weights: Array3<f32>,
    /// Class offsets, `[max_classes]`.
    pub biases: Array1<f32>,
}

/// A trained, frozen meta-transformer that emits additive-model weights.
///
/// Extraction needs nothing beyond these four stages and the metadata; how
/// the model is built internally is irrelevant. Implementations must not
/// mutate parameters, which makes concurrent extraction over a shared model
/// safe without locking.
///
/// Shapes, with `N` context rows and embedding size `E`:
///
/// | stage              | input                                  | output                                      |
/// |--------------------|----------------------------------------|---------------------------------------------|
/// | `encode_features`  | one-hot `[N, max_features, n_bins]`    | `[N, E]`                                    |
/// | `encode_labels`    | labels `[N]` (as `f32`)                | `[N, E]`                                    |
/// | `attend`           | tokens `[N, E]`                        | `[N, E]`                                    |
/// | `decode`           | hidden `[N, E]`, labels `[N]`          | `[max_features, n_bins, max_classes]`, `[max_classes]` |
pub trait MetaTransformer {
    /// Architecture metadata.
    fn meta(&self) -> &ModelMeta;

    /// Embed bin indicators, one token per row.
    fn encode_features(&self, one_hot: ArrayView3<'_, f32>) -> Array2<f32>;

    /// Embed labels, one token per row.
    fn encode_labels(&self, labels: ArrayView1<'_, f32>) -> Array2<f32>;

    /// Run the attention stack over the whole context sequence.
    fn attend(&self, tokens: ArrayView2<'_, f32>) -> Array2<f32>;

    /// Decode additive-model weights and biases from the attention output.
    fn decode(&self, hidden: ArrayView2<'_, f32>, labels: ArrayView1<'_, f32>) -> DecodedWeights;
}

impl<T: MetaTransformer + ?Sized> MetaTransformer for &T {
    fn meta(&self) -> &ModelMeta {
        (**self).meta()
    }

    fn encode_features(&self, one_hot: ArrayView3<'_, f32>) -> Array2<f32> {
        (**self).encode_features(one_hot)
    }

    fn encode_labels(&self, labels: ArrayView1<'_, f32>) -> Array2<f32> {
        (**self).encode_labels(labels)
    }

    fn attend(&self, tokens: ArrayView2<'_, f32>) -> Array2<f32> {
        (**self).attend(tokens)
    }

    fn decode(&self, hidden: ArrayView2<'_, f32>, labels: ArrayView1<'_, f32>) -> DecodedWeights {
        (**self).decode(hidden, labels)
    }
}

impl<T: MetaTransformer + ?Sized> MetaTransformer for Arc<T> {
    fn meta(&self) -> &ModelMeta {
        (**self).meta()
    }

    fn encode_features(&self, one_hot: ArrayView3<'_, f32>) -> Array2<f32> {
        (**self).encode_features(one_hot)
    }

    fn encode_labels(&self, labels: ArrayView1<'_, f32>) -> Array2<f32> {
        (**self).encode_labels(labels)
    }

    fn attend(&self, tokens: ArrayView2<'_, f32>) -> Array2<f32> {
        (**self).attend(tokens)
    }

    fn decode(&self, hidden: ArrayView2<'_, f32>, labels: ArrayView1<'_, f32>) -> DecodedWeights {
        (**self).decode(hidden, labels)
    }
}
