use crate::domain::ports::ArtifactSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub const ARTIFACT_EXTENSION: &str = "json";

/// Reads `<models_dir>/<model_id>.json`.
pub struct FileArtifactSource {
    models_dir: PathBuf,
}

impl FileArtifactSource {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    pub fn path_for(&self, model_id: &str) -> PathBuf {
        self.models_dir
            .join(format!("{}.{}", model_id, ARTIFACT_EXTENSION))
    }
}

#[async_trait]
impl ArtifactSource for FileArtifactSource {
    async fn read(&self, model_id: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(model_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(
                    "FileArtifactSource: read {} bytes from {}",
                    bytes.len(),
                    path.display()
                );
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}
