//! Market data provider configuration parsing from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Where historical bars come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketDataMode {
    Yahoo,
    /// Seeded synthetic bars, no network.
    Mock,
}

impl FromStr for MarketDataMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yahoo" => Ok(MarketDataMode::Yahoo),
            "mock" => Ok(MarketDataMode::Mock),
            _ => anyhow::bail!(
                "Invalid MARKET_DATA_MODE: {}. Must be 'yahoo' or 'mock'",
                s
            ),
        }
    }
}

/// Market data environment configuration
#[derive(Debug, Clone)]
pub struct MarketDataEnvConfig {
    pub yahoo_base_url: String,
    pub timeout_secs: u64,
    pub history_days: u64,
    pub interval: String,
}

impl Default for MarketDataEnvConfig {
    fn default() -> Self {
        Self {
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: 15,
            history_days: 1825,
            interval: "1d".to_string(),
        }
    }
}

impl MarketDataEnvConfig {
    pub fn from_env() -> Self {
        Self {
            yahoo_base_url: env::var("YAHOO_BASE_URL")
                .unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string()),
            timeout_secs: env::var("MARKET_DATA_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse::<u64>()
                .unwrap_or(15),
            history_days: env::var("HISTORY_DAYS")
                .unwrap_or_else(|_| "1825".to_string())
                .parse::<u64>()
                .unwrap_or(1825),
            interval: env::var("BAR_INTERVAL").unwrap_or_else(|_| "1d".to_string()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
