use super::model_artifact::ModelArtifact;
use crate::application::cache::TwoTierCache;
use crate::domain::errors::PredictionError;
use crate::domain::ml::Classifier;
use crate::domain::ports::ArtifactSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Identifier of a ticker's model in the artifact source.
pub fn model_id(ticker: &str) -> String {
    format!("{}_rf", ticker)
}

/// Loads trained models per ticker through the model cache.
pub struct ArtifactStore {
    source: Arc<dyn ArtifactSource>,
    cache: TwoTierCache<ModelArtifact>,
    ttl: Duration,
    read_timeout: Duration,
}

impl ArtifactStore {
    pub fn new(
        source: Arc<dyn ArtifactSource>,
        cache: TwoTierCache<ModelArtifact>,
        ttl: Duration,
        read_timeout: Duration,
    ) -> Self {
        Self {
            source,
            cache,
            ttl,
            read_timeout,
        }
    }

    pub fn cache_key(ticker: &str) -> String {
        format!("model:{}", model_id(ticker))
    }

    /// Cached model for `ticker`, reading the source on a miss.
    ///
    /// Nothing is cached when the source has no artifact or the artifact is
    /// rejected.
    pub async fn load(&self, ticker: &str) -> Result<Arc<ModelArtifact>, PredictionError> {
        let key = Self::cache_key(ticker);

        if let Some(artifact) = self.cache.get(&key).await {
            match artifact.validate(ticker) {
                Ok(()) => return Ok(artifact),
                Err(reason) => warn!(
                    "ArtifactStore: cached model for {} rejected ({}), reloading",
                    ticker, reason
                ),
            }
        }

        let bytes = self.read_source(ticker).await?;
        let artifact = Self::decode(ticker, bytes).await?;

        artifact
            .validate(ticker)
            .map_err(|reason| PredictionError::InvalidArtifact {
                ticker: ticker.to_string(),
                reason,
            })?;

        info!(
            "ArtifactStore: loaded {} model for {} ({} features)",
            artifact.name(),
            ticker,
            artifact.feature_names.len()
        );
        Ok(self.cache.set(&key, artifact, self.ttl).await)
    }

    async fn read_source(&self, ticker: &str) -> Result<Vec<u8>, PredictionError> {
        let id = model_id(ticker);
        let read = self.source.read(&id);
        match tokio::time::timeout(self.read_timeout, read).await {
            Ok(Ok(Some(bytes))) => Ok(bytes),
            Ok(Ok(None)) => Err(PredictionError::ArtifactNotFound {
                ticker: ticker.to_string(),
            }),
            Ok(Err(e)) => Err(PredictionError::ArtifactUnavailable {
                ticker: ticker.to_string(),
                reason: format!("{:#}", e),
            }),
            Err(_) => Err(PredictionError::ArtifactUnavailable {
                ticker: ticker.to_string(),
                reason: format!("read timed out after {:?}", self.read_timeout),
            }),
        }
    }

    /// Forest deserialization is CPU-bound; keep it off the async workers.
    async fn decode(ticker: &str, bytes: Vec<u8>) -> Result<ModelArtifact, PredictionError> {
        let decoded =
            tokio::task::spawn_blocking(move || serde_json::from_slice::<ModelArtifact>(&bytes))
                .await;

        match decoded {
            Ok(Ok(artifact)) => Ok(artifact),
            Ok(Err(e)) => Err(PredictionError::InvalidArtifact {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            }),
            Err(e) => Err(PredictionError::InvalidArtifact {
                ticker: ticker.to_string(),
                reason: format!("decoder task failed: {}", e),
            }),
        }
    }
}
