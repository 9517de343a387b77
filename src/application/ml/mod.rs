pub mod artifact_store;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod model_artifact;

pub use artifact_store::ArtifactStore;
pub use model_artifact::{ClassifierModel, ModelArtifact};
