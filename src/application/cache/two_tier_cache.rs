use super::local_tier::{LocalLookup, LocalTier};
use crate::domain::errors::CacheError;
use crate::domain::ports::{Clock, RemoteCache};
use crate::infrastructure::observability::Metrics;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of asking the remote tier for a key.
#[derive(Debug)]
pub enum RemoteLookup<V> {
    Hit(V),
    Miss,
    Unavailable(CacheError),
}

/// Key/value cache with a shared remote tier and an in-process fallback.
///
/// `get` asks the remote tier first and falls back to the in-process tier on
/// a miss or when the remote tier is unreachable. Remote failures never reach
/// the caller. `set` writes through to both tiers.
///
/// Values come back as `Arc<V>`: remote hits are freshly decoded and local
/// hits are shared read-only, so callers never alias a mutable cached value.
pub struct TwoTierCache<V> {
    name: &'static str,
    remote: Arc<dyn RemoteCache>,
    local: LocalTier<V>,
    clock: Arc<dyn Clock>,
    remote_timeout: Duration,
    metrics: Option<Metrics>,
}

impl<V> TwoTierCache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(
        name: &'static str,
        remote: Arc<dyn RemoteCache>,
        clock: Arc<dyn Clock>,
        remote_timeout: Duration,
    ) -> Self {
        Self {
            name,
            remote,
            local: LocalTier::new(),
            clock,
            remote_timeout,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn get(&self, key: &str) -> Option<Arc<V>> {
        match self.remote_get(key).await {
            RemoteLookup::Hit(value) => {
                debug!("Cache [{}]: remote hit for {}", self.name, key);
                self.record("remote", "hit");
                return Some(Arc::new(value));
            }
            RemoteLookup::Miss => {
                self.record("remote", "miss");
            }
            RemoteLookup::Unavailable(e) => {
                warn!(
                    "Cache [{}]: remote tier unavailable for {} ({}), using in-process tier",
                    self.name, key, e
                );
                self.record("remote", "unavailable");
            }
        }

        match self.local.get(key, self.clock.now()) {
            LocalLookup::Fresh(value) => {
                debug!("Cache [{}]: in-process hit for {}", self.name, key);
                self.record("local", "hit");
                Some(value)
            }
            LocalLookup::Expired => {
                debug!("Cache [{}]: in-process entry for {} expired", self.name, key);
                self.record("local", "expired");
                None
            }
            LocalLookup::Missing => {
                self.record("local", "miss");
                None
            }
        }
    }

    /// Store `value` in both tiers and hand back the shared copy.
    pub async fn set(&self, key: &str, value: V, ttl: Duration) -> Arc<V> {
        match serde_json::to_vec(&value) {
            Ok(payload) => {
                let write = self.remote.set(key, payload, ttl);
                match tokio::time::timeout(self.remote_timeout, write).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(
                        "Cache [{}]: remote write failed for {}: {}",
                        self.name, key, e
                    ),
                    Err(_) => warn!(
                        "Cache [{}]: remote write timed out for {} after {:?}",
                        self.name, key, self.remote_timeout
                    ),
                }
            }
            Err(e) => warn!(
                "Cache [{}]: could not encode value for {}: {}",
                self.name, key, e
            ),
        }

        let value = Arc::new(value);
        self.local
            .insert(key.to_string(), value.clone(), self.clock.now(), ttl);
        value
    }

    /// Query only the remote tier, with the configured timeout.
    pub async fn remote_get(&self, key: &str) -> RemoteLookup<V> {
        let read = self.remote.get(key);
        let payload = match tokio::time::timeout(self.remote_timeout, read).await {
            Ok(Ok(Some(payload))) => payload,
            Ok(Ok(None)) => return RemoteLookup::Miss,
            Ok(Err(e)) => return RemoteLookup::Unavailable(e),
            Err(_) => {
                return RemoteLookup::Unavailable(CacheError::Timeout {
                    duration_ms: self.remote_timeout.as_millis() as u64,
                });
            }
        };

        match serde_json::from_slice(&payload) {
            Ok(value) => RemoteLookup::Hit(value),
            Err(e) => RemoteLookup::Unavailable(CacheError::Codec {
                reason: e.to_string(),
            }),
        }
    }

    /// Entries held by the in-process tier.
    pub fn local_len(&self) -> usize {
        self.local.len()
    }

    fn record(&self, tier: &str, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics
                .cache_lookups_total
                .with_label_values(&[self.name, tier, outcome])
                .inc();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::Bar;
    use crate::infrastructure::mock::{InMemoryRemoteCache, ManualClock, UnreachableRemoteCache};
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
        values: Vec<f64>,
    }

    fn payload() -> Payload {
        Payload {
            name: "AAPL".to_string(),
            values: vec![1.0, 2.5, 3.0],
        }
    }

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_round_trip_then_expiry() {
        let clock = Arc::new(ManualClock::default());
        let remote = Arc::new(InMemoryRemoteCache::new(clock.clone()));
        let cache: TwoTierCache<Payload> =
            TwoTierCache::new("test", remote, clock.clone(), Duration::from_millis(100));

        cache.set("k", payload(), TTL).await;
        assert_eq!(cache.get("k").await.as_deref(), Some(&payload()));

        clock.advance(TTL);
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_falls_back_when_remote_unreachable() {
        let clock = Arc::new(ManualClock::default());
        let cache: TwoTierCache<Payload> = TwoTierCache::new(
            "test",
            Arc::new(UnreachableRemoteCache),
            clock.clone(),
            Duration::from_millis(100),
        );

        let stored = cache.set("k", payload(), TTL).await;
        assert_eq!(*stored, payload());
        assert_eq!(cache.get("k").await.as_deref(), Some(&payload()));
        assert_eq!(cache.local_len(), 1);

        clock.advance(Duration::from_secs(301));
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_remote_hit_shared_across_instances() {
        let clock = Arc::new(ManualClock::default());
        let remote = Arc::new(InMemoryRemoteCache::new(clock.clone()));
        let writer: TwoTierCache<Payload> =
            TwoTierCache::new("a", remote.clone(), clock.clone(), Duration::from_millis(100));
        let reader: TwoTierCache<Payload> =
            TwoTierCache::new("b", remote, clock.clone(), Duration::from_millis(100));

        writer.set("k", payload(), TTL).await;

        assert_eq!(reader.local_len(), 0);
        assert_eq!(reader.get("k").await.as_deref(), Some(&payload()));
    }

    #[tokio::test]
    async fn test_remote_hit_preserves_floats_exactly() {
        let clock = Arc::new(ManualClock::default());
        let remote = Arc::new(InMemoryRemoteCache::new(clock.clone()));
        let writer: TwoTierCache<Payload> =
            TwoTierCache::new("a", remote.clone(), clock.clone(), Duration::from_millis(100));
        let reader: TwoTierCache<Payload> =
            TwoTierCache::new("b", remote, clock, Duration::from_millis(100));

        let stored = Payload {
            name: "noisy".to_string(),
            values: (0..2000)
                .map(|i| {
                    let x = i as f64;
                    100.0 + 10.0 * (x * 0.3).sin() + x * 0.05 + (x + 1.0).ln() / 7.0
                })
                .collect(),
        };
        writer.set("k", stored.clone(), TTL).await;

        let RemoteLookup::Hit(fetched) = reader.remote_get("k").await else {
            panic!("expected a remote hit");
        };
        for (i, (got, want)) in fetched.values.iter().zip(&stored.values).enumerate() {
            assert_eq!(got.to_bits(), want.to_bits(), "value {} changed", i);
        }
        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn test_remote_hit_preserves_bars_exactly() {
        let clock = Arc::new(ManualClock::default());
        let remote = Arc::new(InMemoryRemoteCache::new(clock.clone()));
        let writer: TwoTierCache<Vec<Bar>> =
            TwoTierCache::new("a", remote.clone(), clock.clone(), Duration::from_millis(100));
        let reader: TwoTierCache<Vec<Bar>> =
            TwoTierCache::new("b", remote, clock, Duration::from_millis(100));

        let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        let bars: Vec<Bar> = (0..300)
            .map(|i| {
                let x = i as f64;
                let close = 96.0 + 7.3 * (x * 0.17).sin() + x / 3.0;
                Bar {
                    timestamp: start + ChronoDuration::days(i),
                    open: close * 0.997,
                    high: close * 1.013,
                    low: close * 0.981,
                    close,
                    volume: 1.0e6 / 3.0 + x * 0.1,
                }
            })
            .collect();
        writer.set("ohlcv", bars.clone(), TTL).await;

        assert_eq!(reader.local_len(), 0);
        assert_eq!(reader.get("ohlcv").await.as_deref(), Some(&bars));
    }

    #[tokio::test]
    async fn test_undecodable_remote_payload_is_unavailable() {
        let clock = Arc::new(ManualClock::default());
        let remote = Arc::new(InMemoryRemoteCache::new(clock.clone()));
        remote.set("k", b"not json".to_vec(), TTL).await.unwrap();

        let cache: TwoTierCache<Payload> =
            TwoTierCache::new("test", remote, clock, Duration::from_millis(100));

        assert!(matches!(
            cache.remote_get("k").await,
            RemoteLookup::Unavailable(CacheError::Codec { .. })
        ));
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_slow_remote_times_out() {
        let clock = Arc::new(ManualClock::default());
        let remote = Arc::new(
            InMemoryRemoteCache::new(clock.clone()).with_latency(Duration::from_millis(200)),
        );
        let cache: TwoTierCache<Payload> =
            TwoTierCache::new("test", remote, clock, Duration::from_millis(20));

        let stored = cache.set("k", payload(), TTL).await;
        assert_eq!(*stored, payload());

        assert!(matches!(
            cache.remote_get("k").await,
            RemoteLookup::Unavailable(CacheError::Timeout { duration_ms: 20 })
        ));
        // In-process copy still serves the value.
        assert_eq!(cache.get("k").await.as_deref(), Some(&payload()));
    }
}
