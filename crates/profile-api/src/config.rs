use std::env;
use std::time::Duration;

use asset_resolver::DEFAULT_NFT_API_URL;
use identity_graph_client::DEFAULT_GRAPH_URL;

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub graph_api_url: String,
    pub graph_api_key: Option<String>,
    pub nft_api_url: String,
    pub nft_api_key: Option<String>,
    /// HS256 secret for caller API keys; unset rejects every presented key
    pub api_key_secret: Option<String>,
    /// Shared key stamped onto keyless avatar requests
    pub general_api_key: Option<String>,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
    pub cache_max_entries: u64,
    pub batch_concurrency: Option<usize>,
    pub cors_origins: Vec<String>,
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let graph_api_url =
            non_empty_var("GRAPH_API_URL").unwrap_or_else(|| DEFAULT_GRAPH_URL.to_string());
        let nft_api_url =
            non_empty_var("NFT_API_URL").unwrap_or_else(|| DEFAULT_NFT_API_URL.to_string());

        let rate_limit_max = env::var("RATE_LIMIT_MAX")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50);

        let rate_limit_window = env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));

        let cache_max_entries = env::var("CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100_000);

        // Unset keeps batch fan-out uncapped
        let batch_concurrency = env::var("BATCH_CONCURRENCY")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n > 0);

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        Self {
            port,
            graph_api_url,
            graph_api_key: non_empty_var("GRAPH_API_KEY"),
            nft_api_url,
            nft_api_key: non_empty_var("NFT_API_KEY"),
            api_key_secret: non_empty_var("API_KEY_SECRET"),
            general_api_key: non_empty_var("GENERAL_API_KEY"),
            rate_limit_max,
            rate_limit_window,
            cache_max_entries,
            batch_concurrency,
            cors_origins,
        }
    }
}
