//! In-process fakes shared by the route tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use asset_resolver::AssetResolver;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use edge_cache::{ApiKeyVerifier, MokaStore, RateLimiter};
use handle_classifier::Platform;
use identity_aggregator::Aggregator;
use identity_graph_client::{
    AuthHeaders, GraphError, GraphQuery, GraphResponse, IdentityNode, QueryKind,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::server::create_router;
use crate::state::AppState;

pub const SECRET: &str = "profile-api-test-secret-0123456789";
pub const GENERAL_KEY: &str = "general-key";
pub const VITALIK: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

/// Identity graph answering a handful of fixed identities
#[derive(Default)]
pub struct FakeGraph {
    pub calls: AtomicUsize,
    pub keys: Mutex<Vec<Option<String>>>,
}

impl FakeGraph {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_key(&self) -> Option<String> {
        self.keys.lock().unwrap().last().cloned().flatten()
    }
}

fn node(value: Value) -> GraphResponse {
    GraphResponse::from_node(serde_json::from_value::<IdentityNode>(value).unwrap())
}

#[async_trait]
impl GraphQuery for FakeGraph {
    async fn query(
        &self,
        _kind: QueryKind,
        identity: &str,
        _platform: Platform,
        auth: &AuthHeaders,
    ) -> identity_graph_client::Result<GraphResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().unwrap().push(auth.api_key.clone());

        match identity {
            "vitalik.eth" => Ok(node(json!({
                "platform": "ens",
                "identity": "vitalik.eth",
                "resolvedAddress": [{"network": "ethereum", "address": VITALIK}],
                "profile": {"displayName": "vitalik.eth"},
                "identityGraph": {
                    "vertices": [
                        {"platform": "ethereum", "identity": VITALIK},
                        {"platform": "farcaster", "identity": "vitalik.eth"}
                    ],
                    "edges": []
                }
            }))),
            "dwr" => Ok(node(json!({
                "platform": "farcaster",
                "identity": "dwr",
                "profile": {
                    "displayName": "Dan Romero",
                    "avatar": "https://example.com/dwr.png"
                }
            }))),
            "broken.eth" => Err(GraphError::Upstream {
                code: 502,
                message: "Bad Gateway".to_string(),
            }),
            _ => Err(GraphError::NotFound),
        }
    }
}

pub fn sign_key() -> String {
    encode(
        &Header::default(),
        &json!({ "sub": "partner" }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn test_state(graph: Arc<FakeGraph>, rate_limit: u32) -> AppState {
    let assets = AssetResolver::new(None).unwrap();
    AppState::new(
        Aggregator::new(graph, Arc::new(assets)),
        Arc::new(MokaStore::new(1_000)),
        RateLimiter::new(rate_limit, Duration::from_secs(60)),
        ApiKeyVerifier::new(Some(SECRET)),
        Some(GENERAL_KEY.to_string()),
    )
}

pub fn test_router(state: AppState) -> Router {
    create_router(state, &["*".to_string()])
}

/// Issue a GET and decode the JSON body
pub async fn get(
    router: &Router,
    uri: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, HeaderMap, Value) {
    let mut request = Request::builder().uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, headers, json)
}
