//! Error to HTTP response mapping.
//!
//! Every error body is `{"detail": "<message>"}`.

use crate::domain::errors::PredictionError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Handler error type with HTTP response mapping.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    /// Invalid request parameters (400).
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    pub fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Prediction(e) => match e {
                PredictionError::ArtifactNotFound { .. } => {
                    (StatusCode::NOT_FOUND, "Model not found".to_string())
                }
                PredictionError::NoData { .. } => (
                    StatusCode::NOT_FOUND,
                    "No OHLCV data after grouping.".to_string(),
                ),
                PredictionError::InsufficientData { .. } => (
                    StatusCode::BAD_REQUEST,
                    "Not enough feature rows to predict (after dropna).".to_string(),
                ),
                PredictionError::InvalidTicker { .. } => (StatusCode::BAD_REQUEST, e.to_string()),
                PredictionError::MarketData { .. } => (StatusCode::BAD_GATEWAY, e.to_string()),
                PredictionError::ArtifactUnavailable { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
                }
                PredictionError::InvalidArtifact { .. } | PredictionError::Inference { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();
        (status, axum::Json(json!({ "detail": detail }))).into_response()
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
