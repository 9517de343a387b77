use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::application::cache::TwoTierCache;
use crate::application::market_data::{CachedMarketData, HistoryWindow};
use crate::application::ml::ArtifactStore;
use crate::application::prediction_service::PredictionService;
use crate::config::{Config, MarketDataMode};
use crate::domain::ports::{ArtifactSource, Clock, MarketDataService, RemoteCache};
use crate::infrastructure::mock::SyntheticMarketDataService;
use crate::infrastructure::observability::Metrics;
use crate::infrastructure::{
    FileArtifactSource, RedisRemoteCache, SystemClock, YahooMarketDataService,
};

/// External collaborators the service is assembled from.
pub struct Adapters {
    pub remote_cache: Arc<dyn RemoteCache>,
    pub artifact_source: Arc<dyn ArtifactSource>,
    pub market_data: Arc<dyn MarketDataService>,
    pub clock: Arc<dyn Clock>,
}

impl Adapters {
    /// Production adapters selected by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let remote_cache = RedisRemoteCache::new(&config.cache.redis_url)
            .with_context(|| format!("Invalid REDIS_URL {}", config.cache.redacted_redis_url()))?;

        let market_data: Arc<dyn MarketDataService> = match config.mode {
            MarketDataMode::Yahoo => Arc::new(YahooMarketDataService::new(
                config.market_data.yahoo_base_url.clone(),
                config.market_data.timeout(),
            )),
            MarketDataMode::Mock => Arc::new(SyntheticMarketDataService::new()),
        };

        Ok(Self {
            remote_cache: Arc::new(remote_cache),
            artifact_source: Arc::new(FileArtifactSource::new(config.models.models_dir.clone())),
            market_data,
            clock: Arc::new(SystemClock),
        })
    }
}

pub struct Application {
    pub config: Config,
    pub prediction_service: Arc<PredictionService>,
    pub metrics: Metrics,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self> {
        let adapters = Adapters::from_config(&config)?;
        Self::build_with(config, adapters)
    }

    /// Wire the pipeline around the given adapters. Each call gets its own
    /// caches and metrics registry.
    pub fn build_with(config: Config, adapters: Adapters) -> Result<Self> {
        info!(
            "Building rustsignal Application (market data: {:?}, models: {})...",
            config.mode,
            config.models.models_dir.display()
        );

        let metrics = Metrics::new()?;
        let remote_timeout = config.cache.remote_timeout();

        let model_cache = TwoTierCache::new(
            "model",
            adapters.remote_cache.clone(),
            adapters.clock.clone(),
            remote_timeout,
        )
        .with_metrics(metrics.clone());
        let artifacts = Arc::new(ArtifactStore::new(
            adapters.artifact_source,
            model_cache,
            config.cache.model_ttl(),
            config.models.read_timeout(),
        ));

        let data_cache = TwoTierCache::new(
            "data",
            adapters.remote_cache,
            adapters.clock.clone(),
            remote_timeout,
        )
        .with_metrics(metrics.clone());
        let market_data = Arc::new(CachedMarketData::new(
            adapters.market_data,
            data_cache,
            adapters.clock,
            HistoryWindow {
                days: config.market_data.history_days,
                interval: config.market_data.interval.clone(),
            },
            config.cache.data_ttl(),
            config.market_data.timeout(),
        ));

        let prediction_service =
            Arc::new(PredictionService::new(artifacts, market_data).with_metrics(metrics.clone()));

        info!(
            "Caches ready (model TTL {:?}, data TTL {:?}, remote timeout {:?})",
            config.cache.model_ttl(),
            config.cache.data_ttl(),
            remote_timeout
        );

        Ok(Self {
            config,
            prediction_service,
            metrics,
        })
    }
}
