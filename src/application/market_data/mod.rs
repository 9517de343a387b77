// Cache-backed daily bar fetching
pub mod cached_market_data;

// Bars -> feature table
pub mod feature_engine;

pub use cached_market_data::{CachedMarketData, HistoryWindow};
pub use feature_engine::{FeatureEngine, FeatureRow, FeatureTable};
