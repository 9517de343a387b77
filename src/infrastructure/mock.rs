use crate::domain::errors::CacheError;
use crate::domain::market::Bar;
use crate::domain::ports::{ArtifactSource, Clock, MarketDataService, RemoteCache};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveDate, TimeZone, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

// ===== Clock =====

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let by = ChronoDuration::from_std(by).unwrap_or(ChronoDuration::zero());
        let mut guard = match self.now.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(
            Utc.with_ymd_and_hms(2024, 6, 3, 16, 0, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

// ===== Remote cache tiers =====

struct StoredPayload {
    payload: Vec<u8>,
    created_at: DateTime<Utc>,
    ttl: Duration,
}

/// Remote tier stand-in with the same TTL semantics as the real one.
/// Several caches can share one instance to model several processes.
pub struct InMemoryRemoteCache {
    entries: RwLock<HashMap<String, StoredPayload>>,
    clock: Arc<dyn Clock>,
    latency: Option<Duration>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryRemoteCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            latency: None,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Delay every call, to exercise caller timeouts.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RemoteCache for InMemoryRemoteCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.simulate_latency().await;
        self.reads.fetch_add(1, Ordering::Relaxed);

        let now = self.clock.now();
        let entries = self.entries.read().await;
        Ok(entries.get(key).and_then(|stored| {
            let age = now.signed_duration_since(stored.created_at).to_std().ok()?;
            (age < stored.ttl).then(|| stored.payload.clone())
        }))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.simulate_latency().await;
        self.writes.fetch_add(1, Ordering::Relaxed);

        let stored = StoredPayload {
            payload: value,
            created_at: self.clock.now(),
            ttl,
        };
        self.entries.write().await.insert(key.to_string(), stored);
        Ok(())
    }
}

/// Remote tier whose every call fails, like a Redis that is down.
pub struct UnreachableRemoteCache;

#[async_trait]
impl RemoteCache for UnreachableRemoteCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::Unavailable {
            reason: "connection refused".to_string(),
        })
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable {
            reason: "connection refused".to_string(),
        })
    }
}

// ===== Market data =====

/// Serves a fixed set of bars for every ticker and counts fetches.
pub struct MockMarketDataService {
    bars: Vec<Bar>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockMarketDataService {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Every fetch fails, like a provider outage.
    pub fn failing() -> Self {
        Self {
            bars: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn get_historical_bars(
        &self,
        ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
        _interval: &str,
    ) -> Result<Vec<Bar>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            anyhow::bail!("mock provider outage for {}", ticker);
        }
        Ok(self.bars.clone())
    }
}

/// Seeded random-walk daily bars (weekdays only), stable per ticker.
#[derive(Default)]
pub struct SyntheticMarketDataService;

impl SyntheticMarketDataService {
    pub fn new() -> Self {
        Self
    }

    fn seed_for(ticker: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        ticker.hash(&mut hasher);
        hasher.finish()
    }
}

#[async_trait]
impl MarketDataService for SyntheticMarketDataService {
    async fn get_historical_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        _interval: &str,
    ) -> Result<Vec<Bar>> {
        let mut rng = StdRng::seed_from_u64(Self::seed_for(ticker));
        let mut price: f64 = 50.0 + rng.random_range(0.0..150.0);
        let mut bars = Vec::new();

        let mut day = start;
        while day < end {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                let open = price;
                let close = (open * (1.0 + rng.random_range(-0.02..0.02))).max(0.01);
                let high = open.max(close) * (1.0 + rng.random_range(0.0..0.01));
                let low = open.min(close) * (1.0 - rng.random_range(0.0..0.01));
                let volume = 1_000_000.0 * rng.random_range(0.5..1.5);

                if let Some(ts) = day.and_hms_opt(14, 30, 0) {
                    bars.push(Bar {
                        timestamp: ts.and_utc(),
                        open,
                        high,
                        low,
                        close,
                        volume,
                    });
                }
                price = close;
            }
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        info!(
            "SyntheticMarketDataService: generated {} bars for {}",
            bars.len(),
            ticker
        );
        Ok(bars)
    }
}

// ===== Artifacts =====

/// Artifact source backed by a map, counting reads.
#[derive(Default)]
pub struct InMemoryArtifactSource {
    artifacts: HashMap<String, Vec<u8>>,
    reads: AtomicUsize,
}

impl InMemoryArtifactSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact(mut self, model_id: &str, bytes: Vec<u8>) -> Self {
        self.artifacts.insert(model_id.to_string(), bytes);
        self
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ArtifactSource for InMemoryArtifactSource {
    async fn read(&self, model_id: &str) -> Result<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.artifacts.get(model_id).cloned())
    }
}
