//! Quantile binning.
//!
//! - [`BinningConfig`]: bin count, padded width, threading
//! - [`QuantileBinner`]: fits [`BinEdges`] on reference data and encodes rows
//! - [`compute_bins`]: fit and encode in one call

mod builder;
mod edges;

pub use builder::{BinnedData, BinningConfig, QuantileBinner, compute_bins, pad_features};
pub use edges::BinEdges;
