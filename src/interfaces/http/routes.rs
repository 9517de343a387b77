//! HTTP handlers.
//!
//! - `GET /predict?ticker=X&n=250` - signal, estimate and recent bars
//! - `GET /health` - liveness probe
//! - `GET /metrics` - Prometheus text exposition

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;

use super::AppState;
use super::dto::{HealthResponse, PredictQuery, PredictionResponse};
use super::error::{AppError, AppResult};
use crate::application::prediction_service::DEFAULT_LOOKBACK;

/// `GET /predict`
pub async fn predict(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
) -> AppResult<Json<PredictionResponse>> {
    let ticker = query
        .ticker
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("query parameter 'ticker' is required".into()))?;
    let lookback = query.n.unwrap_or(DEFAULT_LOOKBACK);

    let result = state.prediction_service.predict(ticker.trim(), lookback).await?;
    Ok(Json(PredictionResponse::from(result)))
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
