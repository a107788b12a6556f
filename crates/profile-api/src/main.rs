//! Profile API - resolves web3 handles into unified profiles
//!
//! Serves profile, name-service and derived views over the identity graph
//! behind an in-process edge cache with tiered TTLs, per-IP rate limiting
//! and API key gating.

mod config;
mod edge;
mod error;
mod routes;
mod server;
mod state;

#[cfg(test)]
mod test_support;

use crate::config::Config;
use crate::error::Result;
use crate::server::start_server;
use crate::state::AppState;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("profile_api=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let config = Config::from_env();
    info!(port = config.port, "Starting profile-api");
    info!(graph = %config.graph_api_url, "Identity graph endpoint");
    info!(
        max = config.rate_limit_max,
        window_secs = config.rate_limit_window.as_secs(),
        "Keyless rate limit"
    );
    info!(entries = config.cache_max_entries, "Edge cache capacity");
    match config.batch_concurrency {
        Some(limit) => info!(limit, "Batch fan-out capped"),
        None => info!("Batch fan-out uncapped"),
    }
    if config.api_key_secret.is_none() {
        info!("API_KEY_SECRET unset, presented API keys will be rejected");
    }

    let state = AppState::from_config(&config)?;

    start_server(state, config.port, &config.cors_origins).await?;

    Ok(())
}
