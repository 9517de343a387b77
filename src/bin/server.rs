//! rustsignal server - HTTP prediction service
//!
//! Serves `GET /predict?ticker=<symbol>&n=<bars>` from the trained models in
//! `MODELS_DIR`, caching models and market data in Redis with an in-process
//! fallback.
//!
//! # Usage
//! ```sh
//! REDIS_URL=redis://127.0.0.1:6379/0 cargo run --bin server -- --port 8000
//! ```
//!
//! # Environment Variables
//! - `REDIS_URL` - Remote cache tier (default: redis://127.0.0.1:6379/0)
//! - `MODEL_CACHE_TTL` / `DATA_CACHE_TTL` - Cache TTLs in seconds (default: 300)
//! - `MODELS_DIR` - Directory of `<TICKER>_rf.json` artifacts (default: models)
//! - `MARKET_DATA_MODE` - `yahoo` or `mock` (default: yahoo)

use anyhow::{Context, Result};
use clap::Parser;
use rustsignal::application::system::Application;
use rustsignal::config::Config;
use rustsignal::interfaces::http::{AppState, create_app};
use std::path::PathBuf;
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host to bind to (overrides SERVER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides SERVER_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Model artifacts directory (overrides MODELS_DIR)
    #[arg(long)]
    models_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("rustsignal server {} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(models_dir) = args.models_dir {
        config.models.models_dir = models_dir;
    }
    info!(
        "Configuration loaded: MarketData={:?}, Models={}, Redis={}",
        config.mode,
        config.models.models_dir.display(),
        config.cache.redacted_redis_url()
    );

    let addr = config.server.addr();
    let app = Application::build(config).await?;
    let router = create_app(AppState::from(&app));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received. Draining connections..."),
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
