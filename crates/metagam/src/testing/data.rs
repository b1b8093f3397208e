use ndarray::{Array1, Array2};
use rand::prelude::*;

/// Random dense features, uniform in `[min, max]`.
pub fn random_dense_f32(rows: usize, cols: usize, seed: u64, min: f32, max: f32) -> Array2<f32> {
	assert!(max >= min);
	let mut rng = StdRng::seed_from_u64(seed);
	let width = max - min;
	Array2::from_shape_simple_fn((rows, cols), || min + rng.r#gen::<f32>() * width)
}

/// Labeled blobs, one per class, shifted along every feature.
///
/// Row `r` belongs to class `r % n_classes`. Each feature is
/// `3 * class + u` with `u` uniform in `[-1, 1]`, so classes are separable
/// along any single feature.
pub fn class_blobs(rows: usize, cols: usize, n_classes: usize, seed: u64) -> (Array2<f32>, Array1<u32>) {
	assert!(n_classes >= 1);
	let mut rng = StdRng::seed_from_u64(seed);
	let labels = Array1::from_shape_fn(rows, |r| (r % n_classes) as u32);
	let x = Array2::from_shape_fn((rows, cols), |(r, _)| {
		3.0 * labels[r] as f32 + rng.r#gen::<f32>() * 2.0 - 1.0
	});
	(x, labels)
}

/// Replace roughly `fraction` of the cells with NaN.
pub fn with_missing(mut x: Array2<f32>, fraction: f32, seed: u64) -> Array2<f32> {
	assert!((0.0..=1.0).contains(&fraction));
	let mut rng = StdRng::seed_from_u64(seed);
	x.mapv_inplace(|v| if rng.r#gen::<f32>() < fraction { f32::NAN } else { v });
	x
}
