use std::time::Duration;

use async_trait::async_trait;
use handle_classifier::Platform;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::error::{GraphError, Result};
use crate::query::QueryKind;
use crate::types::{Envelope, GraphResponse};

pub const DEFAULT_GRAPH_URL: &str = "https://graph.web3.bio/graphql";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Caller credentials forwarded to the identity graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthHeaders {
    pub api_key: Option<String>,
}

impl AuthHeaders {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }
}

/// Anything that can answer identity graph queries
#[async_trait]
pub trait GraphQuery: Send + Sync {
    async fn query(
        &self,
        kind: QueryKind,
        identity: &str,
        platform: Platform,
        auth: &AuthHeaders,
    ) -> Result<GraphResponse>;
}

/// HTTP client for the identity graph GraphQL endpoint.
///
/// Issues exactly one request per call; the upstream is metered, so there is
/// no retry.
pub struct GraphClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GraphClient {
    /// Create a client against the default endpoint
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_endpoint(DEFAULT_GRAPH_URL, api_key)
    }

    /// Create a client against a custom endpoint
    pub fn with_endpoint(endpoint: &str, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }

    fn parse_envelope(status: reqwest::StatusCode, body: &str) -> Result<GraphResponse> {
        let envelope: Envelope = match serde_json::from_str(body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(GraphError::Upstream {
                    code: status.as_u16(),
                    message: status
                        .canonical_reason()
                        .unwrap_or("Upstream error")
                        .to_string(),
                })
            }
        };

        if let Some(first) = envelope.errors.as_ref().and_then(|errors| errors.first()) {
            let code = first
                .extensions
                .as_ref()
                .and_then(|ext| ext.code)
                .unwrap_or(if status.is_success() { 500 } else { status.as_u16() });
            return Err(GraphError::Upstream {
                code,
                message: first.message.clone(),
            });
        }

        if let Some(code) = envelope.code {
            if code == 404 {
                return Err(GraphError::NotFound);
            }
            if code >= 400 || !status.is_success() {
                return Err(GraphError::Upstream {
                    code,
                    message: envelope.msg.unwrap_or_else(|| "Upstream error".to_string()),
                });
            }
        }

        if !status.is_success() {
            return Err(GraphError::Upstream {
                code: status.as_u16(),
                message: envelope
                    .msg
                    .unwrap_or_else(|| status.to_string()),
            });
        }

        match envelope.data.and_then(|data| data.identity) {
            Some(node) => Ok(GraphResponse::from_node(node)),
            None => Err(GraphError::NotFound),
        }
    }
}

#[async_trait]
impl GraphQuery for GraphClient {
    async fn query(
        &self,
        kind: QueryKind,
        identity: &str,
        platform: Platform,
        auth: &AuthHeaders,
    ) -> Result<GraphResponse> {
        let body = json!({
            "query": kind.document(),
            "variables": kind.variables(identity, platform),
        });

        debug!(kind = %kind, platform = %platform, identity, "Querying identity graph");

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = auth.api_key.as_ref().or(self.api_key.as_ref()) {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(|e| {
            error!(kind = %kind, identity, error = %e, "Identity graph request failed");
            GraphError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        let result = Self::parse_envelope(status, &text);

        match &result {
            Ok(graph) => debug!(
                kind = %kind,
                identity,
                vertices = graph.vertices.len(),
                "Identity graph answered"
            ),
            Err(GraphError::NotFound) => debug!(kind = %kind, identity, "Identity not found"),
            Err(e) => warn!(kind = %kind, identity, error = %e, "Identity graph error"),
        }

        result
    }
}
