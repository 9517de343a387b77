use thiserror::Error;

/// Errors surfaced to callers of the prediction pipeline
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Model not found for {ticker}")]
    ArtifactNotFound { ticker: String },

    #[error("No OHLCV data for {ticker}")]
    NoData { ticker: String },

    #[error("Not enough feature rows to predict for {ticker}: {bars} daily bars, need at least {required}")]
    InsufficientData {
        ticker: String,
        bars: usize,
        required: usize,
    },

    #[error("Invalid ticker symbol: {ticker:?}")]
    InvalidTicker { ticker: String },

    #[error("Model artifact for {ticker} is invalid: {reason}")]
    InvalidArtifact { ticker: String, reason: String },

    #[error("Model store unavailable for {ticker}: {reason}")]
    ArtifactUnavailable { ticker: String, reason: String },

    #[error("Market data unavailable for {ticker}: {reason}")]
    MarketData { ticker: String, reason: String },

    #[error("Inference failed for {ticker}: {reason}")]
    Inference { ticker: String, reason: String },
}

impl PredictionError {
    /// Short stable label, used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::ArtifactNotFound { .. } => "artifact_not_found",
            PredictionError::NoData { .. } => "no_data",
            PredictionError::InsufficientData { .. } => "insufficient_data",
            PredictionError::InvalidTicker { .. } => "invalid_ticker",
            PredictionError::InvalidArtifact { .. } => "invalid_artifact",
            PredictionError::ArtifactUnavailable { .. } => "artifact_unavailable",
            PredictionError::MarketData { .. } => "market_data",
            PredictionError::Inference { .. } => "inference",
        }
    }
}

/// Remote cache tier failures. Never leaves the cache layer.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Remote cache unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Remote cache timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("Cached payload could not be decoded: {reason}")]
    Codec { reason: String },
}
