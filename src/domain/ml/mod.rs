pub mod classifier;
pub mod feature_registry;

pub use classifier::{Classifier, ModelError, ProbabilisticClassifier};
pub use feature_registry::{FEATURE_COUNT, Feature, MIN_BARS, WARMUP_BARS};
