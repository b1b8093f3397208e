//! Extraction and inference configuration with builder pattern.
//!
//! [`AdditiveConfig`] gathers the constants that govern extraction and
//! inference: the feature ceiling, the softmax temperature and device
//! placement. It uses the `bon` crate for builder generation with validation
//! at build time.
//!
//! # Example
//!
//! ```
//! use metagam::model::AdditiveConfig;
//! use metagam::Device;
//!
//! // All defaults: CPU, temperature 0.8, up to 100 features
//! let config = AdditiveConfig::builder().build().unwrap();
//!
//! let config = AdditiveConfig::builder()
//!     .device("cuda:0".parse().unwrap())
//!     .inference_device(Device::cuda())
//!     .temperature(1.0)
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;

use crate::device::Device;
use crate::error::ConfigError;
use crate::utils::Parallelism;
use crate::{DEFAULT_TEMPERATURE, MAX_FEATURES};

/// Configuration shared by extraction and inference.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct AdditiveConfig {
    /// Feature ceiling. Default: 100. Cannot exceed [`MAX_FEATURES`].
    #[builder(default = MAX_FEATURES)]
    pub max_features: usize,

    /// Expected bins per feature. `None` accepts whatever the model and
    /// artifact carry; `Some` turns a mismatch into an error.
    pub n_bins: Option<u32>,

    /// Softmax temperature applied to summed scores. Default: 0.8.
    ///
    /// Values below 1 sharpen the otherwise under-confident raw scores.
    #[builder(default = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Where the meta-transformer runs. Default: `Cpu`.
    #[builder(default)]
    pub device: Device,

    /// Where the extracted artifact lives and inference runs. Default: `Cpu`.
    #[builder(default)]
    pub inference_device: Device,

    /// Threading for binning and row-wise inference. Default: `Sequential`.
    #[builder(default)]
    pub parallelism: Parallelism,
}

impl<S: additive_config_builder::IsComplete> AdditiveConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is invalid:
    /// - `max_features` outside `1..=100`
    /// - `n_bins < 2`
    /// - `temperature` not finite or `<= 0`
    pub fn build(self) -> Result<AdditiveConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl AdditiveConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_features == 0 || self.max_features > MAX_FEATURES {
            return Err(ConfigError::InvalidMaxFeatures {
                got: self.max_features,
                max: MAX_FEATURES,
            });
        }
        if let Some(n_bins) = self.n_bins
            && n_bins < 2
        {
            return Err(ConfigError::InvalidNBins(n_bins));
        }
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }
        Ok(())
    }
}

impl Default for AdditiveConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_config_is_valid() {
        let config = AdditiveConfig::builder().build().unwrap();
        assert_eq!(config.max_features, 100);
        assert_eq!(config.n_bins, None);
        assert!((config.temperature - 0.8).abs() < 1e-6);
        assert_eq!(config.device, Device::Cpu);
        assert_eq!(config.inference_device, Device::Cpu);
        assert_eq!(config, AdditiveConfig::default());
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.5)]
    #[case(f32::NAN)]
    #[case(f32::INFINITY)]
    fn invalid_temperature(#[case] temperature: f32) {
        let result = AdditiveConfig::builder().temperature(temperature).build();
        assert!(matches!(result, Err(ConfigError::InvalidTemperature(_))));
    }

    #[rstest]
    #[case(0)]
    #[case(101)]
    fn invalid_max_features(#[case] max_features: usize) {
        let result = AdditiveConfig::builder().max_features(max_features).build();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidMaxFeatures { got: max_features, max: 100 }
        );
    }

    #[test]
    fn invalid_n_bins() {
        let result = AdditiveConfig::builder().n_bins(1).build();
        assert_eq!(result.unwrap_err(), ConfigError::InvalidNBins(1));
        assert!(AdditiveConfig::builder().n_bins(2).build().is_ok());
    }

    #[test]
    fn device_customization() {
        let config = AdditiveConfig::builder()
            .device(Device::cuda())
            .inference_device("cuda:1".parse().unwrap())
            .build()
            .unwrap();
        assert_eq!(config.inference_device, Device::Cuda { ordinal: Some(1) });
    }
}
