use crate::domain::market::Bar;
use crate::domain::prediction::{PredictionResult, Signal};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Query parameters for `GET /predict`.
#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    pub ticker: Option<String>,
    /// Number of recent bars to return (default: 250).
    pub n: Option<usize>,
}

/// One bar as displayed by clients.
#[derive(Debug, Clone, Serialize)]
pub struct BarRecord {
    /// ISO-8601 UTC timestamp of the trading day.
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: f64,
}

impl From<&Bar> for BarRecord {
    fn from(bar: &Bar) -> Self {
        Self {
            date: bar.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

/// Response for `GET /predict`.
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub ticker: String,
    pub latest_date: NaiveDate,
    pub signal: Signal,
    pub probability: Option<f64>,
    pub current_price: f64,
    pub predicted_return_tomorrow: Option<f64>,
    pub predicted_price_tomorrow: Option<f64>,
    pub data: Vec<BarRecord>,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            data: result.recent_bars.iter().map(BarRecord::from).collect(),
            ticker: result.ticker,
            latest_date: result.latest_date,
            signal: result.signal,
            probability: result.probability,
            current_price: result.current_price,
            predicted_return_tomorrow: result.estimated_return,
            predicted_price_tomorrow: result.predicted_price,
        }
    }
}

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
