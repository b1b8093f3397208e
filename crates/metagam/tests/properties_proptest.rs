//! Property-based tests for binning, extraction and inference.
//!
//! Inputs are arbitrary finite matrices (with optional missing cells) and
//! arbitrary contiguous labels.

use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

use ndarray::{Array1, Array2};

use metagam::testing::CountingTransformer;
use metagam::{AdditiveConfig, BinningConfig, compute_bins, extract, predict_proba};

// =============================================================================
// Strategies
// =============================================================================

/// Finite values with the occasional missing cell.
fn arb_cell() -> impl Strategy<Value = f32> {
    prop_oneof![
        9 => (-1e4f32..1e4f32),
        1 => Just(f32::NAN),
    ]
}

/// A `[rows, cols]` matrix with `rows` in `1..40` and `cols` in `1..6`.
fn arb_matrix() -> impl Strategy<Value = Array2<f32>> {
    (1usize..40, 1usize..6).prop_flat_map(|(rows, cols)| {
        prop_vec(arb_cell(), rows * cols)
            .prop_map(move |cells| Array2::from_shape_vec((rows, cols), cells).unwrap())
    })
}

/// A matrix plus labels covering `0..n_classes` contiguously.
fn arb_task() -> impl Strategy<Value = (Array2<f32>, Array1<u32>)> {
    (arb_matrix(), 1usize..5).prop_flat_map(|(x, n_classes)| {
        let rows = x.nrows();
        prop_vec(0..n_classes as u32, rows).prop_map(move |raw| {
            // Re-code to contiguous labels in order of first appearance.
            let mut seen = Vec::new();
            let labels = raw
                .iter()
                .map(|label| match seen.iter().position(|s| s == label) {
                    Some(i) => i as u32,
                    None => {
                        seen.push(*label);
                        (seen.len() - 1) as u32
                    }
                })
                .collect::<Array1<u32>>();
            (x.clone(), labels)
        })
    })
}

fn n_classes(y: &Array1<u32>) -> usize {
    y.iter().max().map_or(0, |&m| m as usize + 1)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn bin_edges_are_sorted_and_one_hot_is_exact(x in arb_matrix(), n_bins in 2u32..12) {
        let config = BinningConfig::builder().n_bins(n_bins).width(8).build();
        let binned = compute_bins(x.view(), &config).unwrap();

        prop_assert_eq!(binned.edges.view().dim(), (8, n_bins as usize - 1));
        for row in binned.edges.view().rows() {
            prop_assert!(row.iter().all(|e| !e.is_nan()));
            prop_assert!(row.windows(2).into_iter().all(|w| w[0] <= w[1]));
        }

        prop_assert_eq!(binned.one_hot.dim(), (x.nrows(), 8, n_bins as usize));
        for lane in binned.one_hot.lanes(ndarray::Axis(2)) {
            prop_assert_eq!(lane.sum(), 1.0);
        }
    }

    #[test]
    fn extracted_shapes_follow_the_data((x, y) in arb_task(), n_bins in 2u32..10) {
        let model = CountingTransformer::new(n_bins, 6);
        let artifact = extract(&model, x.view(), y.view(), &AdditiveConfig::default()).unwrap();

        let (f, b, c) = (x.ncols(), n_bins as usize, n_classes(&y));
        prop_assert_eq!(artifact.weights().dim(), (f, b, c));
        prop_assert_eq!(artifact.biases().len(), c);
        prop_assert_eq!(artifact.bin_edges().view().dim(), (f, b - 1));
    }

    #[test]
    fn probabilities_lie_on_the_simplex((x, y) in arb_task(), x_test in arb_matrix()) {
        let model = CountingTransformer::new(6, 6);
        let artifact = extract(&model, x.view(), y.view(), &AdditiveConfig::default()).unwrap();

        // Reuse the test rows with the training width.
        let cols = x.ncols();
        let x_test = Array2::from_shape_fn((x_test.nrows(), cols), |(r, c)| x_test[[r, c % x_test.ncols()]]);
        let probs = predict_proba(x.view(), x_test.view(), &artifact, &AdditiveConfig::default()).unwrap();

        prop_assert_eq!(probs.dim(), (x_test.nrows(), n_classes(&y)));
        for row in probs.rows() {
            prop_assert!(row.iter().all(|&p| p.is_finite() && (0.0..=1.0).contains(&p)));
            prop_assert!((row.sum() - 1.0).abs() < 1e-4);
        }
    }
}
