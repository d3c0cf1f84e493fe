//! Common test utilities for gbm-rust integration tests.

#![allow(dead_code)]

use gbm_rust::*;
use ndarray::Array2;
use rand::prelude::*;

/// Aptitude test score, previous experience in months, pass.
const APTITUDE: [(f64, f64, f64); 26] = [
    (5.0, 6.0, 0.0),
    (1.0, 15.0, 0.0),
    (1.0, 12.0, 0.0),
    (4.0, 6.0, 0.0),
    (1.0, 15.0, 1.0),
    (1.0, 6.0, 0.0),
    (4.0, 16.0, 1.0),
    (1.0, 10.0, 1.0),
    (3.0, 12.0, 0.0),
    (4.0, 26.0, 1.0),
    (5.0, 2.0, 1.0),
    (1.0, 12.0, 0.0),
    (3.0, 18.0, 0.0),
    (3.0, 3.0, 0.0),
    (1.0, 24.0, 1.0),
    (2.0, 8.0, 0.0),
    (1.0, 9.0, 0.0),
    (4.0, 18.0, 0.0),
    (4.0, 22.0, 1.0),
    (5.0, 3.0, 1.0),
    (4.0, 12.0, 0.0),
    (4.0, 24.0, 1.0),
    (2.0, 18.0, 1.0),
    (2.0, 6.0, 0.0),
    (1.0, 8.0, 0.0),
    (5.0, 12.0, 0.0),
];

/// The 26-row aptitude data set: two features and a 0/1 pass target.
pub fn aptitude_data() -> (Array2<f64>, Vec<f64>) {
    let observations = Array2::from_shape_fn((APTITUDE.len(), 2), |(i, j)| {
        if j == 0 {
            APTITUDE[i].0
        } else {
            APTITUDE[i].1
        }
    });
    let targets = APTITUDE.iter().map(|row| row.2).collect();
    (observations, targets)
}

/// Create noisy regression data with a non-linear target
pub fn create_regression_data(num_samples: usize, num_features: usize) -> (Array2<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(42);

    let mut observations = Array2::zeros((num_samples, num_features));
    for i in 0..num_samples {
        for j in 0..num_features {
            observations[[i, j]] = rng.gen_range(-5.0..5.0);
        }
    }

    let targets = observations
        .rows()
        .into_iter()
        .map(|row| {
            let mut target = 0.0;
            for (j, value) in row.iter().enumerate() {
                target += value * ((j + 1) as f64 * 0.5);
            }
            if row.len() > 1 && row[1] > 0.0 {
                target += 3.0;
            }
            target + rng.gen_range(-0.1..0.1)
        })
        .collect();

    (observations, targets)
}

/// Create multi-class data where the class is decided by the first feature
pub fn create_multiclass_data(num_samples: usize, num_classes: usize) -> (Array2<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(7);

    let mut observations = Array2::zeros((num_samples, 3));
    let mut targets = Vec::with_capacity(num_samples);
    for i in 0..num_samples {
        let class = i % num_classes;
        observations[[i, 0]] = class as f64 * 10.0 + rng.gen_range(0.0..5.0);
        observations[[i, 1]] = rng.gen_range(-1.0..1.0);
        observations[[i, 2]] = rng.gen_range(-1.0..1.0);
        targets.push(class as f64);
    }

    (observations, targets)
}

/// Mean squared error
pub fn mean_squared_error(targets: &[f64], predictions: &[f64]) -> f64 {
    assert_eq!(targets.len(), predictions.len());
    targets
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p) * (t - p))
        .sum::<f64>()
        / targets.len() as f64
}

/// Fraction of predicted labels that differ from the targets
pub fn error_rate(targets: &[f64], predictions: &[f64]) -> f64 {
    assert_eq!(targets.len(), predictions.len());
    let errors = targets
        .iter()
        .zip(predictions)
        .filter(|(t, p)| t != p)
        .count();
    errors as f64 / targets.len() as f64
}

/// Configuration builder with small, deterministic defaults for tests
pub fn test_config() -> GradientBoostConfigBuilder {
    GradientBoostConfigBuilder::new()
        .iterations(50)
        .learning_rate(0.1)
        .maximum_tree_depth(3)
        .minimum_split_size(1)
        .minimum_information_gain(1e-6)
        .num_threads(1)
        .seed(42)
}
