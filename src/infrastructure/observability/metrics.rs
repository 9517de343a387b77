//! Prometheus metrics definitions for rustsignal
//!
//! All metrics use the `rustsignal_` prefix and live in a private registry.

use prometheus::{CounterVec, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Prometheus metrics for the prediction service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Cache lookups by cache name, tier and outcome
    pub cache_lookups_total: CounterVec,
    /// Successful predictions by signal
    pub predictions_total: CounterVec,
    /// Failed predictions by error kind
    pub prediction_errors_total: CounterVec,
    /// End-to-end prediction latency in seconds
    pub prediction_latency_seconds: Histogram,
}

impl Metrics {
    /// Create a new Metrics instance with all counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let cache_lookups_total = CounterVec::new(
            Opts::new(
                "rustsignal_cache_lookups_total",
                "Cache lookups by cache, tier and outcome",
            ),
            &["cache", "tier", "outcome"],
        )?;
        registry.register(Box::new(cache_lookups_total.clone()))?;

        let predictions_total = CounterVec::new(
            Opts::new("rustsignal_predictions_total", "Predictions served by signal"),
            &["signal"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let prediction_errors_total = CounterVec::new(
            Opts::new(
                "rustsignal_prediction_errors_total",
                "Failed predictions by error kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(prediction_errors_total.clone()))?;

        let prediction_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "rustsignal_prediction_latency_seconds",
                "End-to-end prediction latency in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
        )?;
        registry.register(Box::new(prediction_latency_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            cache_lookups_total,
            predictions_total,
            prediction_errors_total,
            prediction_latency_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_prediction(&self, signal: &str) {
        self.predictions_total.with_label_values(&[signal]).inc();
    }

    pub fn inc_prediction_error(&self, kind: &str) {
        self.prediction_errors_total
            .with_label_values(&[kind])
            .inc();
    }

    pub fn observe_prediction_latency(&self, seconds: f64) {
        self.prediction_latency_seconds.observe(seconds);
    }
}
