//! Model types.
//!
//! - [`MetaTransformer`]: contract of the frozen transformer extraction runs
//! - [`ModelMeta`]: architecture metadata it reports
//! - [`AdditiveModel`]: the extracted `(weights, biases, bin_edges)` artifact
//! - [`AdditiveConfig`]: extraction and inference settings
//! - [`AdditiveClassifier`]: fit/predict wrapper with label encoding
//!
//! # Example
//!
//! ```
//! use metagam::model::{AdditiveClassifier, AdditiveConfig};
//! use metagam::testing::{CountingTransformer, class_blobs};
//!
//! let (x, y) = class_blobs(60, 3, 2, 0);
//! let clf = AdditiveClassifier::new(CountingTransformer::new(8, 10), AdditiveConfig::default());
//! let fitted = clf.fit(x.view(), y.as_slice().unwrap()).unwrap();
//!
//! let probs = fitted.predict_proba(x.view()).unwrap();
//! assert_eq!(probs.dim(), (60, 2));
//! ```

mod additive;
mod classifier;
mod config;
mod labels;
mod meta;
mod transformer;

pub use additive::AdditiveModel;
pub use classifier::{AdditiveClassifier, FittedAdditiveClassifier};
pub use config::{AdditiveConfig, AdditiveConfigBuilder};
pub use labels::LabelEncoder;
pub use meta::{ADDITIVE_MODEL_TYPE, ModelMeta};
pub use transformer::{DecodedWeights, MetaTransformer};
