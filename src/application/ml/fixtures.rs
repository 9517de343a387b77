//! Tiny trained forests for unit tests.

use super::model_artifact::{ClassifierModel, ModelArtifact};
use crate::domain::ml::FEATURE_COUNT;
use crate::domain::ml::feature_registry::feature_names;
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

/// 40 rows whose every feature grows with the row index; label 1 for the upper half.
pub fn training_set() -> (Vec<Vec<f64>>, Vec<u32>) {
    let rows: Vec<Vec<f64>> = (0..40)
        .map(|i| {
            (0..FEATURE_COUNT)
                .map(|j| i as f64 + j as f64 * 0.1)
                .collect()
        })
        .collect();
    let labels = (0..40).map(|i| u32::from(i >= 20)).collect();
    (rows, labels)
}

pub fn schema() -> Vec<String> {
    feature_names().into_iter().map(String::from).collect()
}

pub fn classifier_artifact(ticker: &str) -> ModelArtifact {
    let (rows, labels) = training_set();
    let x = DenseMatrix::from_2d_vec(&rows).unwrap();
    let forest = RandomForestClassifier::fit(
        &x,
        &labels,
        RandomForestClassifierParameters::default().with_n_trees(10),
    )
    .unwrap();
    ModelArtifact::new(ticker, schema(), ClassifierModel::RandomForest(forest))
}

pub fn probability_artifact(ticker: &str) -> ModelArtifact {
    let (rows, labels) = training_set();
    let x = DenseMatrix::from_2d_vec(&rows).unwrap();
    let y: Vec<f64> = labels.iter().map(|&l| l as f64).collect();
    let forest = RandomForestRegressor::fit(
        &x,
        &y,
        RandomForestRegressorParameters::default().with_n_trees(10),
    )
    .unwrap();
    ModelArtifact::new(ticker, schema(), ClassifierModel::ProbabilityForest(forest))
}
