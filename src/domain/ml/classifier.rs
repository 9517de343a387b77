use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Model does not emit probabilities")]
    CapabilityAbsent,
}

/// Base capability: every served model can pick a class for a feature vector.
///
/// Implementations are immutable once loaded and are shared across concurrent
/// requests without locking.
pub trait Classifier: Send + Sync {
    /// Predicted class, 0 or 1 (1 means the price is expected to rise).
    fn predict_class(&self, features: &[f64]) -> Result<u8, ModelError>;

    /// Optional capability, checked explicitly by callers.
    fn as_probabilistic(&self) -> Option<&dyn ProbabilisticClassifier> {
        None
    }

    /// Model name/type for logs
    fn name(&self) -> &str;
}

/// Capability of models that can score class 1 in [0, 1].
pub trait ProbabilisticClassifier: Send + Sync {
    fn predict_probability(&self, features: &[f64]) -> Result<f64, ModelError>;
}

/// Class-1 probability when the model has the capability, `Ok(None)` when it does not.
pub fn probability_of(
    model: &dyn Classifier,
    features: &[f64],
) -> Result<Option<f64>, ModelError> {
    match model.as_probabilistic() {
        Some(p) => p.predict_probability(features).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysBuy;

    impl Classifier for AlwaysBuy {
        fn predict_class(&self, _features: &[f64]) -> Result<u8, ModelError> {
            Ok(1)
        }

        fn name(&self) -> &str {
            "always-buy"
        }
    }

    struct Scored(f64);

    impl Classifier for Scored {
        fn predict_class(&self, _features: &[f64]) -> Result<u8, ModelError> {
            Ok(u8::from(self.0 >= 0.5))
        }

        fn as_probabilistic(&self) -> Option<&dyn ProbabilisticClassifier> {
            Some(self)
        }

        fn name(&self) -> &str {
            "scored"
        }
    }

    impl ProbabilisticClassifier for Scored {
        fn predict_probability(&self, _features: &[f64]) -> Result<f64, ModelError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_probability_absent_without_capability() {
        let p = probability_of(&AlwaysBuy, &[0.0; 3]).unwrap();
        assert!(p.is_none());
    }

    #[test]
    fn test_probability_present_with_capability() {
        let model = Scored(0.7);
        let p = probability_of(&model, &[0.0; 3]).unwrap();
        assert_eq!(p, Some(0.7));
        assert_eq!(model.predict_class(&[]).unwrap(), 1);
    }
}
