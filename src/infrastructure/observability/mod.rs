//! Pull-based observability for rustsignal
//!
//! Metrics are collected in-process and exposed in Prometheus text format on
//! `GET /metrics`. Logs go through `tracing`.

pub mod metrics;

pub use metrics::Metrics;
