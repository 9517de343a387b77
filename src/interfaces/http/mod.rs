//! Axum application builder.

pub mod dto;
pub mod error;
pub mod routes;

use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::prediction_service::PredictionService;
use crate::application::system::Application;
use crate::infrastructure::observability::Metrics;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub prediction_service: Arc<PredictionService>,
    pub metrics: Metrics,
}

impl From<&Application> for AppState {
    fn from(app: &Application) -> Self {
        Self {
            prediction_service: app.prediction_service.clone(),
            metrics: app.metrics.clone(),
        }
    }
}

/// Create the Axum application with all routes.
pub fn create_app(state: AppState) -> Router {
    // Browser frontends call the API directly
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/predict", get(routes::predict))
        .route("/health", get(routes::health))
        .route("/metrics", get(routes::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
