use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AssetError, Result};
use crate::uri::{classify_asset, AssetUri, TokenRef};

pub const DEFAULT_NFT_API_URL: &str = "https://api.simplehash.com/api/v0";
const REQUEST_TIMEOUT_SECS: u64 = 5;
const CACHE_TTL_SECS: u64 = 3600; // 1 hour
/// Provider images may point at another token; follow at most this many
const MAX_TOKEN_HOPS: usize = 3;

#[derive(Debug, Deserialize)]
struct NftResponse {
    image_url: Option<String>,
    previews: Option<NftPreviews>,
}

#[derive(Debug, Deserialize)]
struct NftPreviews {
    image_medium_url: Option<String>,
}

/// Resolves avatar/contenthash URIs to fetchable URLs.
///
/// Never fails: anything that cannot be resolved degrades to the original URI.
pub struct AssetResolver {
    client: Client,
    nft_api_url: String,
    nft_api_key: Option<String>,
    token_cache: Cache<String, String>,
}

impl AssetResolver {
    /// Create a resolver against the default NFT metadata provider
    pub fn new(nft_api_key: Option<String>) -> Result<Self> {
        Self::with_nft_api(DEFAULT_NFT_API_URL, nft_api_key)
    }

    /// Create a resolver against a custom NFT metadata provider
    pub fn with_nft_api(nft_api_url: &str, nft_api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let token_cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
            .build();

        Ok(Self {
            client,
            nft_api_url: nft_api_url.trim_end_matches('/').to_string(),
            nft_api_key,
            token_cache,
        })
    }

    /// Resolve a URI to a gateway URL, or `None` for empty input
    pub async fn resolve(&self, uri: Option<&str>) -> Option<String> {
        let uri = uri?.trim();
        if uri.is_empty() {
            return None;
        }

        match classify_asset(uri) {
            AssetUri::Resolved(url) | AssetUri::Opaque(url) => Some(url),
            AssetUri::Token(token) => match self.resolve_token(token).await {
                Ok(url) => Some(url),
                Err(e) => {
                    debug!(uri, error = %e, "Falling back to raw token URI");
                    Some(uri.to_string())
                }
            },
        }
    }

    /// Follow token images until one normalizes to a URL
    async fn resolve_token(&self, mut token: TokenRef) -> Result<String> {
        for _ in 0..MAX_TOKEN_HOPS {
            let image = self.token_image(&token).await?;
            match classify_asset(&image) {
                AssetUri::Resolved(url) | AssetUri::Opaque(url) => return Ok(url),
                AssetUri::Token(next) => {
                    debug!(from = %token.token_id, to = %next.token_id, "Token image is a token");
                    token = next;
                }
            }
        }
        Err(AssetError::Provider("token image chain too deep".to_string()))
    }

    /// Look up the image of an NFT, memoized per token
    async fn token_image(&self, token: &TokenRef) -> Result<String> {
        let api_key = self
            .nft_api_key
            .as_deref()
            .ok_or_else(|| AssetError::Provider("no API key configured".to_string()))?;
        let network = token
            .network()
            .ok_or(AssetError::UnsupportedChain(token.chain_id))?;

        let cache_key = format!("{network}/{}/{}", token.contract, token.token_id);
        if let Some(cached) = self.token_cache.get(&cache_key).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/nfts/{network}/{}/{}",
            self.nft_api_url, token.contract, token.token_id
        );
        let response = self
            .client
            .get(&url)
            .header("X-API-KEY", api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .inspect_err(|e| warn!(url = %url, error = %e, "NFT metadata request failed"))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "NFT provider returned error");
            return Err(AssetError::Provider(format!(
                "provider returned status {}",
                response.status()
            )));
        }

        let data: NftResponse = response.json().await?;
        let image = data
            .image_url
            .or_else(|| data.previews.and_then(|p| p.image_medium_url))
            .filter(|image| !image.is_empty())
            .ok_or_else(|| AssetError::Provider("token has no image".to_string()))?;

        self.token_cache.insert(cache_key, image.clone()).await;
        Ok(image)
    }
}
