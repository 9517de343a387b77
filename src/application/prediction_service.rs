use crate::application::market_data::{CachedMarketData, FeatureEngine};
use crate::application::ml::ArtifactStore;
use crate::domain::errors::PredictionError;
use crate::domain::market::bar::tail;
use crate::domain::ml::classifier::probability_of;
use crate::domain::ml::{Classifier, MIN_BARS};
use crate::domain::prediction::{PredictionResult, ReturnStats, Signal, predicted_price};
use crate::infrastructure::observability::Metrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub const DEFAULT_LOOKBACK: usize = 250;
const MAX_TICKER_LEN: usize = 32;

/// Accepts exchange-suffixed and index symbols (`VNM.VN`, `^GSPC`, `EURUSD=X`, `BRK-B`).
pub fn validate_ticker(ticker: &str) -> Result<(), PredictionError> {
    let valid = !ticker.is_empty()
        && ticker.len() <= MAX_TICKER_LEN
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '^' | '='));

    if valid {
        Ok(())
    } else {
        Err(PredictionError::InvalidTicker {
            ticker: ticker.to_string(),
        })
    }
}

/// Orchestrates one prediction: model, bars, features, signal and return estimate.
pub struct PredictionService {
    artifacts: Arc<ArtifactStore>,
    market_data: Arc<CachedMarketData>,
    metrics: Option<Metrics>,
}

impl PredictionService {
    pub fn new(artifacts: Arc<ArtifactStore>, market_data: Arc<CachedMarketData>) -> Self {
        Self {
            artifacts,
            market_data,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn predict(
        &self,
        ticker: &str,
        lookback: usize,
    ) -> Result<PredictionResult, PredictionError> {
        let started = Instant::now();
        let outcome = self.run(ticker, lookback).await;

        if let Some(metrics) = &self.metrics {
            metrics.observe_prediction_latency(started.elapsed().as_secs_f64());
            match &outcome {
                Ok(result) => metrics.inc_prediction(result.signal.as_str()),
                Err(e) => metrics.inc_prediction_error(e.kind()),
            }
        }

        match &outcome {
            Ok(result) => info!(
                "Prediction {}: {} (p={:?}, est={:?}) in {:?}",
                ticker,
                result.signal,
                result.probability,
                result.estimated_return,
                started.elapsed()
            ),
            Err(e) => debug!("Prediction {} failed: {}", ticker, e),
        }
        outcome
    }

    async fn run(
        &self,
        ticker: &str,
        lookback: usize,
    ) -> Result<PredictionResult, PredictionError> {
        validate_ticker(ticker)?;

        // Unknown tickers fail before any market data is fetched.
        let model = self.artifacts.load(ticker).await?;
        let bars = self.market_data.daily_bars(ticker).await?;

        let table = FeatureEngine::compute(&bars).map_err(|e| {
            error!("Feature computation failed for {}: {}", ticker, e);
            PredictionError::Inference {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            }
        })?;

        let Some(latest) = table.latest() else {
            return Err(PredictionError::InsufficientData {
                ticker: ticker.to_string(),
                bars: bars.len(),
                required: MIN_BARS,
            });
        };
        let features = latest.vector();

        let class = model.predict_class(features).map_err(|e| {
            error!("{} model failed on {}: {}", model.name(), ticker, e);
            PredictionError::Inference {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            }
        })?;
        let signal = Signal::from_class(class);

        let probability = match probability_of(&*model, features) {
            Ok(p) => p,
            Err(e) => {
                warn!("Probability unavailable for {}: {}", ticker, e);
                None
            }
        };

        let current_price = latest.close;
        let estimated_return = ReturnStats::from_closes(&table.closes())
            .map(|stats| stats.expected_return(probability, signal));
        let predicted_price = estimated_return.map(|r| predicted_price(current_price, r));

        Ok(PredictionResult {
            ticker: ticker.to_string(),
            latest_date: latest.timestamp.date_naive(),
            signal,
            probability,
            current_price,
            estimated_return,
            predicted_price,
            recent_bars: tail(&bars, lookback).to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ticker_accepts_common_symbols() {
        for ticker in ["AAPL", "VNM.VN", "^GSPC", "EURUSD=X", "BRK-B", "FPT"] {
            assert!(validate_ticker(ticker).is_ok(), "{} should be valid", ticker);
        }
    }

    #[test]
    fn test_validate_ticker_rejects_paths_and_junk() {
        let too_long = "A".repeat(33);
        for ticker in ["", "../etc/passwd", "AA PL", "a/b", too_long.as_str()] {
            assert!(
                matches!(
                    validate_ticker(ticker),
                    Err(PredictionError::InvalidTicker { .. })
                ),
                "{:?} should be rejected",
                ticker
            );
        }
    }
}
