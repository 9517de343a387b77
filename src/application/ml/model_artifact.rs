use crate::domain::ml::feature_registry::validate_schema;
use crate::domain::ml::{Classifier, FEATURE_COUNT, ModelError, ProbabilisticClassifier};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::RandomForestClassifier;
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;

pub type ForestClassifier = RandomForestClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;
pub type ForestRegressor = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// The estimator inside an artifact.
///
/// `RandomForest` only picks a class. `ProbabilityForest` is a regressor fit
/// on 0/1 labels, so its output is the class-1 probability.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum ClassifierModel {
    RandomForest(ForestClassifier),
    ProbabilityForest(ForestRegressor),
}

/// Serialized model for one ticker, with the feature order it was trained on.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub ticker: String,
    pub feature_names: Vec<String>,
    pub model: ClassifierModel,
}

impl ModelArtifact {
    pub fn new(
        ticker: impl Into<String>,
        feature_names: Vec<String>,
        model: ClassifierModel,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            feature_names,
            model,
        }
    }

    /// Reject artifacts trained on another schema or for another ticker.
    pub fn validate(&self, ticker: &str) -> Result<(), String> {
        if !self.ticker.eq_ignore_ascii_case(ticker) {
            return Err(format!(
                "artifact was trained for '{}', requested '{}'",
                self.ticker, ticker
            ));
        }
        validate_schema(&self.feature_names)
    }

    fn input(features: &[f64]) -> Result<DenseMatrix<f64>, ModelError> {
        if features.len() != FEATURE_COUNT {
            return Err(ModelError::Prediction(format!(
                "expected {} features, got {}",
                FEATURE_COUNT,
                features.len()
            )));
        }
        DenseMatrix::from_2d_vec(&vec![features.to_vec()])
            .map_err(|e| ModelError::Prediction(format!("Matrix creation failed: {}", e)))
    }

    fn regress(model: &ForestRegressor, features: &[f64]) -> Result<f64, ModelError> {
        let predictions = model
            .predict(&Self::input(features)?)
            .map_err(|e| ModelError::Prediction(e.to_string()))?;
        predictions
            .first()
            .map(|p| p.clamp(0.0, 1.0))
            .ok_or_else(|| ModelError::Prediction("No prediction returned".to_string()))
    }
}

impl Classifier for ModelArtifact {
    fn predict_class(&self, features: &[f64]) -> Result<u8, ModelError> {
        match &self.model {
            ClassifierModel::RandomForest(forest) => {
                let predictions = forest
                    .predict(&Self::input(features)?)
                    .map_err(|e| ModelError::Prediction(e.to_string()))?;
                match predictions.first().copied() {
                    Some(0) => Ok(0),
                    Some(1) => Ok(1),
                    Some(other) => Err(ModelError::Prediction(format!(
                        "unexpected class label {}",
                        other
                    ))),
                    None => Err(ModelError::Prediction("No prediction returned".to_string())),
                }
            }
            ClassifierModel::ProbabilityForest(forest) => {
                Self::regress(forest, features).map(|p| u8::from(p >= 0.5))
            }
        }
    }

    fn as_probabilistic(&self) -> Option<&dyn ProbabilisticClassifier> {
        match self.model {
            ClassifierModel::ProbabilityForest(_) => Some(self),
            ClassifierModel::RandomForest(_) => None,
        }
    }

    fn name(&self) -> &str {
        match self.model {
            ClassifierModel::RandomForest(_) => "random_forest",
            ClassifierModel::ProbabilityForest(_) => "probability_forest",
        }
    }
}

impl ProbabilisticClassifier for ModelArtifact {
    fn predict_probability(&self, features: &[f64]) -> Result<f64, ModelError> {
        match &self.model {
            ClassifierModel::ProbabilityForest(forest) => Self::regress(forest, features),
            ClassifierModel::RandomForest(_) => Err(ModelError::CapabilityAbsent),
        }
    }
}
