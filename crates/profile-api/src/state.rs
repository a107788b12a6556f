use std::sync::Arc;

use asset_resolver::AssetResolver;
use chrono::{DateTime, Utc};
use edge_cache::{ApiKeyVerifier, CacheStore, MokaStore, RateLimiter};
use identity_aggregator::Aggregator;
use identity_graph_client::GraphClient;

use crate::config::Config;
use crate::error::Result;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub cache: Arc<dyn CacheStore>,
    pub limiter: Arc<RateLimiter>,
    pub verifier: Arc<ApiKeyVerifier>,
    pub general_api_key: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        aggregator: Aggregator,
        cache: Arc<dyn CacheStore>,
        limiter: RateLimiter,
        verifier: ApiKeyVerifier,
        general_api_key: Option<String>,
    ) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            cache,
            limiter: Arc::new(limiter),
            verifier: Arc::new(verifier),
            general_api_key,
            started_at: Utc::now(),
        }
    }

    /// Wire the production collaborators from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let graph =
            GraphClient::with_endpoint(&config.graph_api_url, config.graph_api_key.clone())?;
        let assets = AssetResolver::with_nft_api(&config.nft_api_url, config.nft_api_key.clone())?;
        let aggregator = Aggregator::new(Arc::new(graph), Arc::new(assets))
            .with_batch_concurrency(config.batch_concurrency);

        Ok(Self::new(
            aggregator,
            Arc::new(MokaStore::new(config.cache_max_entries)),
            RateLimiter::new(config.rate_limit_max, config.rate_limit_window),
            ApiKeyVerifier::new(config.api_key_secret.as_deref()),
            config.general_api_key.clone(),
        ))
    }
}
