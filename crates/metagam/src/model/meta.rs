//! Model metadata.
//!
//! Architecture facts a frozen meta-transformer reports about itself.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{DEFAULT_N_BINS, MAX_FEATURES};

/// Model type tag of additive meta-transformers.
pub const ADDITIVE_MODEL_TYPE: &str = "additive";

/// Model type assumed when a checkpoint records neither tag.
const FALLBACK_MODEL_TYPE: &str = "tabpfn";

/// Metadata of a frozen meta-transformer.
///
/// Loaded alongside the model weights by whatever collaborator restores the
/// checkpoint. Older checkpoints only record `model_maker`; see
/// [`resolved_model_type`](Self::resolved_model_type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Explicit model type tag.
    #[serde(default)]
    pub model_type: Option<String>,
    /// Legacy tag naming the architecture builder.
    #[serde(default)]
    pub model_maker: Option<String>,
    /// Bins per feature the feature encoder was trained on.
    #[serde(default = "default_n_bins")]
    pub n_bins: u32,
    /// Input width of the feature encoder.
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    /// Number of class slots emitted by the decoder.
    pub max_classes: usize,
}

fn default_n_bins() -> u32 {
    DEFAULT_N_BINS
}

fn default_max_features() -> usize {
    MAX_FEATURES
}

impl ModelMeta {
    /// Metadata for an additive model with the default feature width.
    pub fn additive(n_bins: u32, max_classes: usize) -> Self {
        Self {
            model_type: Some(ADDITIVE_MODEL_TYPE.to_string()),
            model_maker: None,
            n_bins,
            max_features: MAX_FEATURES,
            max_classes,
        }
    }

    /// Set the model type tag.
    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = Some(model_type.into());
        self
    }

    /// Set the legacy model maker tag.
    pub fn with_model_maker(mut self, model_maker: impl Into<String>) -> Self {
        self.model_maker = Some(model_maker.into());
        self
    }

    /// Set the feature encoder width.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Model type, falling back to `model_maker`, then to `"tabpfn"`.
    pub fn resolved_model_type(&self) -> &str {
        self.model_type
            .as_deref()
            .or(self.model_maker.as_deref())
            .unwrap_or(FALLBACK_MODEL_TYPE)
    }

    /// Check the architecture facts extraction relies on.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidMaxFeatures`] if `max_features` is outside
    ///   `1..=MAX_FEATURES`
    /// - [`ConfigError::InvalidNBins`] if `n_bins < 2`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_features == 0 || self.max_features > MAX_FEATURES {
            return Err(ConfigError::InvalidMaxFeatures {
                got: self.max_features,
                max: MAX_FEATURES,
            });
        }
        if self.n_bins < 2 {
            return Err(ConfigError::InvalidNBins(self.n_bins));
        }
        Ok(())
    }

    /// Fails unless the resolved model type is `"additive"`.
    pub fn ensure_additive(&self) -> Result<(), ConfigError> {
        match self.resolved_model_type() {
            ADDITIVE_MODEL_TYPE => Ok(()),
            other => Err(ConfigError::IncompatibleModelType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_type_resolution() {
        let meta = ModelMeta::additive(64, 10);
        assert_eq!(meta.resolved_model_type(), "additive");

        let legacy = ModelMeta {
            model_type: None,
            model_maker: Some("additive".into()),
            ..ModelMeta::additive(64, 10)
        };
        assert_eq!(legacy.resolved_model_type(), "additive");

        let bare = ModelMeta {
            model_type: None,
            model_maker: None,
            ..ModelMeta::additive(64, 10)
        };
        assert_eq!(bare.resolved_model_type(), "tabpfn");

        let both = ModelMeta::additive(64, 10).with_model_maker("mlp");
        assert_eq!(both.resolved_model_type(), "additive");
    }

    #[test]
    fn ensure_additive_names_found_type() {
        assert!(ModelMeta::additive(64, 10).ensure_additive().is_ok());

        let err = ModelMeta::additive(64, 10)
            .with_model_type("perceiver")
            .ensure_additive()
            .unwrap_err();
        assert_eq!(err, ConfigError::IncompatibleModelType("perceiver".into()));
    }

    #[test]
    fn validate_checks_architecture_limits() {
        assert!(ModelMeta::additive(64, 10).validate().is_ok());

        let wide = ModelMeta::additive(64, 10).with_max_features(MAX_FEATURES + 1);
        assert_eq!(
            wide.validate().unwrap_err(),
            ConfigError::InvalidMaxFeatures { got: 101, max: MAX_FEATURES }
        );
        let empty = ModelMeta::additive(64, 10).with_max_features(0);
        assert!(matches!(empty.validate(), Err(ConfigError::InvalidMaxFeatures { got: 0, .. })));
        assert_eq!(ModelMeta::additive(1, 10).validate().unwrap_err(), ConfigError::InvalidNBins(1));
    }

    #[test]
    fn meta_deserializes_with_defaults() {
        let meta: ModelMeta =
            serde_json::from_str(r#"{"model_maker": "additive", "max_classes": 10}"#).unwrap();
        assert_eq!(meta.n_bins, DEFAULT_N_BINS);
        assert_eq!(meta.max_features, MAX_FEATURES);
        assert_eq!(meta.resolved_model_type(), "additive");
    }
}
