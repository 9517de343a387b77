//! Configuration module for rustsignal.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Cache, Market data, Models and Server.

mod cache_config;
mod market_data_config;
mod model_config;
mod server_config;

pub use cache_config::CacheEnvConfig;
pub use market_data_config::{MarketDataEnvConfig, MarketDataMode};
pub use model_config::ModelEnvConfig;
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: MarketDataMode,
    pub cache: CacheEnvConfig,
    pub market_data: MarketDataEnvConfig,
    pub models: ModelEnvConfig,
    pub server: ServerEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let mode_str = env::var("MARKET_DATA_MODE").unwrap_or_else(|_| "yahoo".to_string());
        let mode =
            MarketDataMode::from_str(&mode_str).context("Failed to load market data mode")?;

        Ok(Self {
            mode,
            cache: CacheEnvConfig::from_env(),
            market_data: MarketDataEnvConfig::from_env(),
            models: ModelEnvConfig::from_env(),
            server: ServerEnvConfig::from_env(),
        })
    }
}
