use crate::domain::errors::CacheError;
use crate::domain::market::Bar;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::time::Duration;

/// Provider of raw daily bars (network fetch).
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Raw records for `[start, end)`. Records may be unsorted and may contain
    /// several entries for the same day; an empty vector means "no data".
    async fn get_historical_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: &str,
    ) -> Result<Vec<Bar>>;
}

/// Persistent store of serialized model artifacts (read-only here).
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// `Ok(None)` when no artifact exists under `model_id`.
    async fn read(&self, model_id: &str) -> Result<Option<Vec<u8>>>;
}

/// Shared, TTL-based key/value tier living outside the process.
#[async_trait]
pub trait RemoteCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;
}

/// Time source, injectable so TTL behaviour can be tested.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
