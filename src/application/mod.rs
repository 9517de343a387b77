// Two-tier (remote + in-process) caching
pub mod cache;

// Market data fetching and feature computation
pub mod market_data;

// Model artifacts and loading
pub mod ml;

// Prediction orchestration
pub mod prediction_service;

// System wiring
pub mod system;
