//! Data preparation.
//!
//! The [`binned`] module discretizes raw feature matrices into per-feature
//! quantile bins. Feature matrices are sample-major `[n_rows, n_features]`
//! `f32` arrays throughout the crate.

pub mod binned;

pub use binned::{BinEdges, BinnedData, BinningConfig, QuantileBinner, compute_bins, pad_features};
