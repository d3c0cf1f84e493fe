//! Classification-specific integration tests.

use gbm_rust::*;
use ndarray::Axis;

mod common;
use common::*;

#[test]
fn test_aptitude_binary_classification() {
    let (observations, targets) = aptitude_data();
    let learner = ClassificationGradientBoostLearner::new(test_config().build().unwrap()).unwrap();
    let model = learner.learn(observations.view(), &targets).unwrap();

    assert!(model.is_binary());
    assert_eq!(model.trees().len(), 1);
    assert_eq!(model.trees()[0].len(), 49);

    let predictions = model.predict_batch(observations.view()).unwrap();
    let error = error_rate(&targets, predictions.as_slice().unwrap());

    // Rows 1 and 4 share features but disagree on the label.
    assert!(error >= 1.0 / 26.0 - 1e-12);
    assert!(error < 0.2, "training error {}", error);
}

#[test]
fn test_aptitude_deep_trees_reproduce_reference_error() {
    let (observations, targets) = aptitude_data();
    let fit = |threads: usize| {
        let config = test_config()
            .iterations(100)
            .maximum_tree_depth(5)
            .minimum_split_size(1)
            .minimum_information_gain(1e-4)
            .seed(42)
            .num_threads(threads)
            .build()
            .unwrap();
        ClassificationGradientBoostLearner::new(config)
            .unwrap()
            .learn(observations.view(), &targets)
            .unwrap()
    };

    let first = fit(1);
    assert_eq!(first, fit(1));
    assert_eq!(first, fit(4));

    let predictions = first.predict_batch(observations.view()).unwrap();
    let error = error_rate(&targets, predictions.as_slice().unwrap());
    assert!((error - 0.038461538461538464).abs() < 1e-6, "training error {}", error);
}

#[test]
fn test_multi_class_one_vs_all() {
    let (observations, targets) = create_multiclass_data(90, 3);
    let model = ClassificationGradientBoostLearner::new(test_config().iterations(30).build().unwrap())
        .unwrap()
        .learn(observations.view(), &targets)
        .unwrap();

    assert!(!model.is_binary());
    assert_eq!(model.classes(), &[0.0, 1.0, 2.0]);
    assert_eq!(model.trees().len(), 3);
    assert!(model.trees().iter().all(|series| series.len() == 29));

    let predictions = model.predict_batch(observations.view()).unwrap();
    assert_eq!(error_rate(&targets, predictions.as_slice().unwrap()), 0.0);
}

#[test]
fn test_probabilities_agree_with_predictions() {
    let (observations, targets) = create_multiclass_data(60, 4);
    let model = ClassificationGradientBoostLearner::new(test_config().iterations(20).build().unwrap())
        .unwrap()
        .learn(observations.view(), &targets)
        .unwrap();

    let probabilities = model.predict_probability_batch(observations.view()).unwrap();
    for (row, probability) in observations.axis_iter(Axis(0)).zip(&probabilities) {
        let total: f64 = probability.probabilities.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(probability.prediction, model.predict(&row).unwrap());

        let best = probability
            .probabilities
            .iter()
            .cloned()
            .fold((f64::NAN, f64::MIN), |best, candidate| if candidate.1 > best.1 { candidate } else { best });
        assert_eq!(best.0, probability.prediction);
    }
}

#[test]
fn test_binary_labels_are_preserved() {
    let (observations, targets) = aptitude_data();
    let relabeled: Vec<f64> = targets.iter().map(|&t| if t == 1.0 { 7.0 } else { 3.0 }).collect();
    let model = ClassificationGradientBoostLearner::new(test_config().build().unwrap())
        .unwrap()
        .learn(observations.view(), &relabeled)
        .unwrap();

    assert_eq!(model.classes(), &[3.0, 7.0]);
    for prediction in model.predict_batch(observations.view()).unwrap().iter() {
        assert!(*prediction == 3.0 || *prediction == 7.0);
    }

    let probability = model.predict_probability(&observations.row(0)).unwrap();
    let p3 = probability.probability_of(3.0).unwrap();
    let p7 = probability.probability_of(7.0).unwrap();
    assert!((p3 + p7 - 1.0).abs() < 1e-12);
}

#[test]
fn test_classification_early_stopping() {
    let (observations, targets) = create_multiclass_data(120, 3);
    let (train_x, valid_x) = observations.view().split_at(Axis(0), 90);
    let (train_y, valid_y) = targets.split_at(90);

    let learner = ClassificationGradientBoostLearner::new(test_config().iterations(31).build().unwrap()).unwrap();
    let model = learner
        .learn_with_early_stopping(train_x, train_y, valid_x, valid_y, &error_rate, 5)
        .unwrap();

    let kept = model.trees()[0].len();
    assert_eq!(kept % 5, 0);
    assert!(model.trees().iter().all(|series| series.len() == kept));

    let predictions = model.predict_batch(valid_x).unwrap();
    assert_eq!(error_rate(valid_y, predictions.as_slice().unwrap()), 0.0);
}

#[test]
fn test_classification_input_errors() {
    let (observations, targets) = aptitude_data();
    let learner = ClassificationGradientBoostLearner::new(test_config().build().unwrap()).unwrap();

    assert!(learner.learn(observations.view(), &targets[..5]).is_err());
    assert!(learner.learn_indexed(observations.view(), &targets, &[0, 26]).is_err());
    assert!(learner
        .learn_with_early_stopping(observations.view(), &targets, observations.view(), &targets, &error_rate, 0)
        .is_err());
}
