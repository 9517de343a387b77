#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use rustsignal::application::ml::{ClassifierModel, ModelArtifact};
use rustsignal::application::system::{Adapters, Application};
use rustsignal::config::{
    CacheEnvConfig, Config, MarketDataEnvConfig, MarketDataMode, ModelEnvConfig, ServerEnvConfig,
};
use rustsignal::domain::market::Bar;
use rustsignal::domain::ml::FEATURE_COUNT;
use rustsignal::domain::ml::feature_registry::feature_names;
use rustsignal::domain::ports::RemoteCache;
use rustsignal::infrastructure::FileArtifactSource;
use rustsignal::infrastructure::mock::{ManualClock, MockMarketDataService};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::path::Path;
use std::sync::Arc;

/// `n` consecutive daily bars from 2023-01-02, oscillating around an uptrend.
pub fn daily_bars(n: usize) -> Vec<Bar> {
    let first = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut prev_close = 100.0;
    (0..n)
        .map(|i| {
            let x = i as f64;
            let close = 100.0 + 10.0 * (x * 0.3).sin() + x * 0.05;
            let open = prev_close;
            prev_close = close;
            let day = first.checked_add_days(Days::new(i as u64)).unwrap();
            Bar {
                timestamp: day.and_hms_opt(14, 30, 0).unwrap().and_utc(),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1_000_000.0 + (i % 7) as f64 * 10_000.0,
            }
        })
        .collect()
}

fn training_rows() -> (DenseMatrix<f64>, Vec<u32>) {
    let rows: Vec<Vec<f64>> = (0..40)
        .map(|i| {
            (0..FEATURE_COUNT)
                .map(|j| i as f64 + j as f64 * 0.1)
                .collect()
        })
        .collect();
    let labels = (0..40).map(|i| u32::from(i >= 20)).collect();
    (DenseMatrix::from_2d_vec(&rows).unwrap(), labels)
}

fn schema() -> Vec<String> {
    feature_names().into_iter().map(String::from).collect()
}

/// Class-only forest.
pub fn classifier_artifact(ticker: &str) -> ModelArtifact {
    let (x, y) = training_rows();
    let forest = RandomForestClassifier::fit(
        &x,
        &y,
        RandomForestClassifierParameters::default().with_n_trees(10),
    )
    .unwrap();
    ModelArtifact::new(ticker, schema(), ClassifierModel::RandomForest(forest))
}

/// Probability forest whose output is `p` for every input.
pub fn constant_probability_artifact(ticker: &str, p: f64) -> ModelArtifact {
    let (x, _) = training_rows();
    let y = vec![p; 40];
    let forest = RandomForestRegressor::fit(
        &x,
        &y,
        RandomForestRegressorParameters::default().with_n_trees(5),
    )
    .unwrap();
    ModelArtifact::new(ticker, schema(), ClassifierModel::ProbabilityForest(forest))
}

pub fn write_artifact(dir: &Path, artifact: &ModelArtifact) {
    let path = dir.join(format!("{}_rf.json", artifact.ticker));
    std::fs::write(path, serde_json::to_vec(artifact).unwrap()).unwrap();
}

pub fn test_config(models_dir: &Path) -> Config {
    Config {
        mode: MarketDataMode::Mock,
        cache: CacheEnvConfig::default(),
        market_data: MarketDataEnvConfig::default(),
        models: ModelEnvConfig {
            models_dir: models_dir.to_path_buf(),
            read_timeout_ms: 5000,
        },
        server: ServerEnvConfig::default(),
    }
}

pub struct Harness {
    pub app: Application,
    pub provider: Arc<MockMarketDataService>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(
    models_dir: &Path,
    remote: Arc<dyn RemoteCache>,
    provider: MockMarketDataService,
    clock: Arc<ManualClock>,
) -> Harness {
    let provider = Arc::new(provider);
    let adapters = Adapters {
        remote_cache: remote,
        artifact_source: Arc::new(FileArtifactSource::new(models_dir)),
        market_data: provider.clone(),
        clock: clock.clone(),
    };
    let app = Application::build_with(test_config(models_dir), adapters).unwrap();
    Harness {
        app,
        provider,
        clock,
    }
}
