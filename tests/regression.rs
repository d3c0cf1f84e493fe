//! Regression-specific integration tests.

use gbm_rust::*;

mod common;
use common::*;

fn train_mse(config: GradientBoostConfig) -> f64 {
    let (observations, targets) = create_regression_data(200, 4);
    let model = RegressionGradientBoostLearner::new(config)
        .unwrap()
        .learn(observations.view(), &targets)
        .unwrap();
    let predictions = model.predict_batch(observations.view()).unwrap();
    mean_squared_error(&targets, predictions.as_slice().unwrap())
}

#[test]
fn test_training_error_drops_with_iterations() {
    let errors: Vec<f64> = [1, 5, 20, 60]
        .iter()
        .map(|&iterations| train_mse(test_config().iterations(iterations).build().unwrap()))
        .collect();

    for pair in errors.windows(2) {
        assert!(pair[1] < pair[0], "errors did not decrease: {:?}", errors);
    }
    assert!(errors[3] < errors[0] * 0.2);
}

#[test]
fn test_constant_model_predicts_the_mean() {
    let (observations, targets) = create_regression_data(50, 2);
    let model = RegressionGradientBoostLearner::new(test_config().iterations(1).build().unwrap())
        .unwrap()
        .learn(observations.view(), &targets)
        .unwrap();

    let mean = targets.iter().sum::<f64>() / targets.len() as f64;
    assert!(model.trees().is_empty());
    for prediction in model.predict_batch(observations.view()).unwrap().iter() {
        assert!((prediction - mean).abs() < 1e-12);
    }
}

#[test]
fn test_subsampling_is_reproducible() {
    let config = test_config().sub_sample_ratio(0.5).build().unwrap();
    let (observations, targets) = create_regression_data(120, 3);
    let learner = RegressionGradientBoostLearner::new(config.clone()).unwrap();

    let first = learner.learn(observations.view(), &targets).unwrap();
    let second = learner.learn(observations.view(), &targets).unwrap();
    assert_eq!(first, second);

    let reseeded = RegressionGradientBoostLearner::new(GradientBoostConfig { seed: 7, ..config })
        .unwrap()
        .learn(observations.view(), &targets)
        .unwrap();
    assert_ne!(first, reseeded);
}

#[test]
fn test_feature_sampling_still_learns() {
    let error = train_mse(test_config().features_per_split(1).build().unwrap());
    let baseline = train_mse(test_config().iterations(1).build().unwrap());
    assert!(error < baseline * 0.5);
}

#[test]
fn test_absolute_loss_resists_outliers() {
    let (observations, mut targets) = create_regression_data(100, 2);
    targets[0] = 1e6;

    let squared = RegressionGradientBoostLearner::new(test_config().iterations(1).build().unwrap())
        .unwrap()
        .learn(observations.view(), &targets)
        .unwrap();
    let absolute = RegressionGradientBoostLearner::new(
        test_config().iterations(1).loss(LossConfig::Absolute).build().unwrap(),
    )
    .unwrap()
    .learn(observations.view(), &targets)
    .unwrap();

    assert!(squared.initial_loss() > 1000.0);
    assert!(absolute.initial_loss().abs() < 100.0);
}

#[test]
fn test_quantile_loss_orders_predictions() {
    let (observations, targets) = create_regression_data(200, 2);
    let fit = |alpha: f64| {
        RegressionGradientBoostLearner::new(
            test_config()
                .iterations(30)
                .loss(LossConfig::Quantile { alpha })
                .build()
                .unwrap(),
        )
        .unwrap()
        .learn(observations.view(), &targets)
        .unwrap()
    };

    let low = fit(0.1);
    let high = fit(0.9);
    assert!(low.initial_loss() < high.initial_loss());

    let low_predictions = low.predict_batch(observations.view()).unwrap();
    let high_predictions = high.predict_batch(observations.view()).unwrap();
    let above = targets
        .iter()
        .zip(high_predictions.iter())
        .filter(|(t, p)| t <= p)
        .count();
    assert!(above as f64 / targets.len() as f64 > 0.6);
    assert!(low_predictions.sum() < high_predictions.sum());
}

#[test]
fn test_huber_loss_learns() {
    let baseline = train_mse(test_config().iterations(1).build().unwrap());
    let huber = |builder: GradientBoostConfigBuilder| train_mse(builder.loss(LossConfig::huber()).build().unwrap());

    assert!(huber(test_config()) < baseline * 0.3);
    assert!(huber(test_config().features_per_split(1)) < baseline * 0.5);
    assert!(huber(test_config().sub_sample_ratio(0.5).features_per_split(2)) < baseline * 0.5);
}

#[test]
fn test_huber_loss_is_reproducible_under_sampling() {
    let (observations, targets) = create_regression_data(120, 3);
    let config = test_config()
        .loss(LossConfig::Huber { alpha: 0.8 })
        .sub_sample_ratio(0.5)
        .features_per_split(2)
        .build()
        .unwrap();

    let single = RegressionGradientBoostLearner::new(config.clone())
        .unwrap()
        .learn(observations.view(), &targets)
        .unwrap();
    let threaded = RegressionGradientBoostLearner::new(GradientBoostConfig { num_threads: 4, ..config })
        .unwrap()
        .learn(observations.view(), &targets)
        .unwrap();
    assert_eq!(single, threaded);
}

#[test]
fn test_huber_loss_resists_outliers() {
    let (observations, mut targets) = create_regression_data(100, 2);
    let clean = targets[1..].to_vec();
    targets[0] = 1e6;

    let model = RegressionGradientBoostLearner::new(test_config().loss(LossConfig::huber()).build().unwrap())
        .unwrap()
        .learn(observations.view(), &targets)
        .unwrap();
    assert!(model.initial_loss().abs() < 100.0);

    let predictions = model.predict_batch(observations.view()).unwrap();
    let mean = clean.iter().sum::<f64>() / clean.len() as f64;
    let variance = clean.iter().map(|t| (t - mean) * (t - mean)).sum::<f64>() / clean.len() as f64;
    let error = mean_squared_error(&clean, &predictions.as_slice().unwrap()[1..]);
    assert!(error < variance * 0.5, "clean-row error {} vs variance {}", error, variance);
}

#[test]
fn test_huber_learn_indexed_ignores_other_rows() {
    let (observations, mut targets) = create_regression_data(80, 2);
    let indices: Vec<usize> = (0..40).collect();
    let learner =
        RegressionGradientBoostLearner::new(test_config().loss(LossConfig::huber()).build().unwrap()).unwrap();
    let model = learner.learn_indexed(observations.view(), &targets, &indices).unwrap();

    // The transition point is estimated from the indexed rows only.
    for target in targets.iter_mut().skip(40) {
        *target = 1e9;
    }
    let perturbed = learner.learn_indexed(observations.view(), &targets, &indices).unwrap();
    assert_eq!(model, perturbed);

    let predictions = model.predict_batch(observations.view()).unwrap();
    let indexed = &targets[..40];
    let constant = indexed.iter().sum::<f64>() / indexed.len() as f64;
    let baseline = mean_squared_error(indexed, &vec![constant; 40]);
    assert!(mean_squared_error(indexed, &predictions.as_slice().unwrap()[..40]) < baseline * 0.5);
}

#[test]
fn test_learn_indexed_ignores_other_rows() {
    let (observations, mut targets) = create_regression_data(60, 2);
    let indices: Vec<usize> = (0..30).collect();
    let learner = RegressionGradientBoostLearner::new(test_config().iterations(10).build().unwrap()).unwrap();
    let model = learner.learn_indexed(observations.view(), &targets, &indices).unwrap();

    for target in targets.iter_mut().skip(30) {
        *target = -1e9;
    }
    let perturbed = learner.learn_indexed(observations.view(), &targets, &indices).unwrap();
    assert_eq!(model, perturbed);
}

#[test]
fn test_early_stopping_returns_prefix_of_full_model() {
    let (observations, targets) = create_regression_data(200, 3);
    let (train_x, valid_x) = observations.view().split_at(ndarray::Axis(0), 150);
    let (train_y, valid_y) = targets.split_at(150);

    let config = test_config().iterations(41).learning_rate(0.3).build().unwrap();
    let learner = RegressionGradientBoostLearner::new(config).unwrap();
    let full = learner.learn(train_x, train_y).unwrap();
    let stopped = learner
        .learn_with_early_stopping(train_x, train_y, valid_x, valid_y, &mean_squared_error, 10)
        .unwrap();

    assert_eq!(stopped.trees().len() % 10, 0);
    assert!(stopped.trees().len() <= full.trees().len());
    assert_eq!(stopped.trees(), &full.trees()[..stopped.trees().len()]);
}

#[test]
fn test_input_errors() {
    let learner = RegressionGradientBoostLearner::new(test_config().build().unwrap()).unwrap();
    let (observations, targets) = create_regression_data(20, 2);

    assert!(matches!(
        learner.learn(observations.view(), &targets[..10]),
        Err(GbmError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        learner.learn_indexed(observations.view(), &targets, &[1, 2, 99]),
        Err(GbmError::IndexOutOfBounds { .. })
    ));

    let mut with_nan = observations.clone();
    with_nan[[3, 1]] = f64::NAN;
    assert!(matches!(
        learner.learn(with_nan.view(), &targets),
        Err(GbmError::InvalidParameter { .. })
    ));

    let model = learner.learn(observations.view(), &targets).unwrap();
    assert!(model.predict(&ndarray::array![1.0].view()).is_err());

    assert!(GradientBoostConfigBuilder::new().learning_rate(0.0).build().is_err());
    assert!(GradientBoostConfigBuilder::new().iterations(0).build().is_err());
    assert!(GradientBoostConfigBuilder::new().sub_sample_ratio(1.5).build().is_err());
}
