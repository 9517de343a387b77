use crate::application::cache::TwoTierCache;
use crate::domain::errors::PredictionError;
use crate::domain::market::{Bar, aggregate_daily};
use crate::domain::ports::{Clock, MarketDataService};
use chrono::{Days, NaiveDate};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetch window and interval for historical bars.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    pub days: u64,
    pub interval: String,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self {
            days: 1825,
            interval: "1d".to_string(),
        }
    }
}

/// Daily bars per ticker, fetched from the provider through the data cache.
pub struct CachedMarketData {
    provider: Arc<dyn MarketDataService>,
    cache: TwoTierCache<Vec<Bar>>,
    clock: Arc<dyn Clock>,
    window: HistoryWindow,
    ttl: Duration,
    fetch_timeout: Duration,
}

impl CachedMarketData {
    pub fn new(
        provider: Arc<dyn MarketDataService>,
        cache: TwoTierCache<Vec<Bar>>,
        clock: Arc<dyn Clock>,
        window: HistoryWindow,
        ttl: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            clock,
            window,
            ttl,
            fetch_timeout,
        }
    }

    /// `[today - days, today)` in UTC.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        let end = self.clock.now().date_naive();
        let start = end
            .checked_sub_days(Days::new(self.window.days))
            .unwrap_or(NaiveDate::MIN);
        (start, end)
    }

    pub fn cache_key(ticker: &str, start: NaiveDate, end: NaiveDate, interval: &str) -> String {
        format!("ohlcv:{}:{}:{}:{}", ticker, start, end, interval)
    }

    /// One bar per day, ascending. Empty provider results are `NoData` and
    /// are not cached.
    pub async fn daily_bars(&self, ticker: &str) -> Result<Arc<Vec<Bar>>, PredictionError> {
        let (start, end) = self.date_range();
        let key = Self::cache_key(ticker, start, end, &self.window.interval);

        if let Some(bars) = self.cache.get(&key).await {
            return Ok(bars);
        }

        let fetch = self
            .provider
            .get_historical_bars(ticker, start, end, &self.window.interval);
        let raw = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!("CachedMarketData: fetch failed for {}: {:#}", ticker, e);
                return Err(PredictionError::MarketData {
                    ticker: ticker.to_string(),
                    reason: format!("{:#}", e),
                });
            }
            Err(_) => {
                warn!(
                    "CachedMarketData: fetch for {} timed out after {:?}",
                    ticker, self.fetch_timeout
                );
                return Err(PredictionError::MarketData {
                    ticker: ticker.to_string(),
                    reason: format!("fetch timed out after {:?}", self.fetch_timeout),
                });
            }
        };

        let raw_len = raw.len();
        let daily = aggregate_daily(raw);
        if daily.is_empty() {
            return Err(PredictionError::NoData {
                ticker: ticker.to_string(),
            });
        }

        debug!(
            "CachedMarketData: {} raw records -> {} daily bars for {}",
            raw_len,
            daily.len(),
            ticker
        );
        Ok(self.cache.set(&key, daily, self.ttl).await)
    }
}
