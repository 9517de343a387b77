//! Model artifact location parsing from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    pub models_dir: PathBuf,
    pub read_timeout_ms: u64,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            read_timeout_ms: 5000,
        }
    }
}

impl ModelEnvConfig {
    pub fn from_env() -> Self {
        Self {
            models_dir: PathBuf::from(
                env::var("MODELS_DIR").unwrap_or_else(|_| "models".to_string()),
            ),
            read_timeout_ms: env::var("ARTIFACT_READ_TIMEOUT_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u64>()
                .unwrap_or(5000),
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
