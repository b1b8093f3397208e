//! Test utilities: seeded synthetic data and a deterministic meta-transformer.
//!
//! Public so integration tests and benchmarks can share them.

mod data;
mod transformer;

pub use data::{class_blobs, random_dense_f32, with_missing};
pub use transformer::CountingTransformer;
