//! Cache configuration parsing from environment variables.

use std::env;
use std::time::Duration;

/// Cache environment configuration
#[derive(Debug, Clone)]
pub struct CacheEnvConfig {
    pub redis_url: String,
    pub model_ttl_secs: u64,
    pub data_ttl_secs: u64,
    pub remote_timeout_ms: u64,
}

impl Default for CacheEnvConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379/0".to_string(),
            model_ttl_secs: 300,
            data_ttl_secs: 300,
            remote_timeout_ms: 250,
        }
    }
}

impl CacheEnvConfig {
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string()),
            model_ttl_secs: env::var("MODEL_CACHE_TTL")
                .unwrap_or_else(|_| "300".to_string())
                .parse::<u64>()
                .unwrap_or(300),
            data_ttl_secs: env::var("DATA_CACHE_TTL")
                .unwrap_or_else(|_| "300".to_string())
                .parse::<u64>()
                .unwrap_or(300),
            remote_timeout_ms: env::var("REMOTE_CACHE_TIMEOUT_MS")
                .unwrap_or_else(|_| "250".to_string())
                .parse::<u64>()
                .unwrap_or(250),
        }
    }

    pub fn model_ttl(&self) -> Duration {
        Duration::from_secs(self.model_ttl_secs)
    }

    pub fn data_ttl(&self) -> Duration {
        Duration::from_secs(self.data_ttl_secs)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// Redis URL safe for logs: user and password are masked.
    pub fn redacted_redis_url(&self) -> String {
        let (scheme, rest) = match self.redis_url.split_once("://") {
            Some((scheme, rest)) => (Some(scheme), rest),
            None => (None, self.redis_url.as_str()),
        };
        // Userinfo ends at the last '@' before the path.
        let authority_end = rest.find('/').unwrap_or(rest.len());
        let host = match rest[..authority_end].rfind('@') {
            Some(at) => format!("***@{}", &rest[at + 1..]),
            None => rest.to_string(),
        };
        match scheme {
            Some(scheme) => format!("{}://{}", scheme, host),
            None => host,
        }
    }
}
