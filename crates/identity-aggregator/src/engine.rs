//! Aggregation engine: validation, graph lookup and per-endpoint views

use asset_resolver::AssetResolver;
use futures::FutureExt;
use handle_classifier::{accepts_handle, classify, is_valid_ethereum_address, Identity, Platform};
use identity_graph_client::{AuthHeaders, GraphQuery, GraphResponse, QueryKind};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::batch::settle_all;
use crate::credentials::{aggregate, HumanPolicy};
use crate::error::{ErrorRecord, ResolveError, Result};
use crate::merge::{ethereum_fallback, merge, ranked_vertices, MergeOrder};
use crate::types::{
    AvatarRecord, BatchItem, CredentialAggregate, CredentialsRecord, DomainRecord, NsRecord,
    ProfileRecord, WalletDomain, WalletRecord,
};

fn validate(identity: Identity) -> Result<Identity> {
    if !identity.platform.is_fetchable() {
        return Err(ResolveError::InvalidIdentity);
    }
    if identity.platform == Platform::Ethereum && !is_valid_ethereum_address(&identity.handle) {
        return Err(ResolveError::InvalidIdentity);
    }
    Ok(identity)
}

/// Classify a raw handle and check that it can be resolved
pub fn prepare_identity(raw: &str) -> Result<Identity> {
    classify(raw)
        .ok_or(ResolveError::InvalidIdentity)
        .and_then(validate)
}

/// Like [`prepare_identity`], for endpoints that fix the platform
pub fn prepare_platform_identity(platform: Platform, raw: &str) -> Result<Identity> {
    if raw.contains(',') {
        let identity = classify(raw).ok_or(ResolveError::InvalidIdentity)?;
        if identity.platform != platform {
            return Err(ResolveError::InvalidIdentity);
        }
        return validate(identity);
    }
    if !accepts_handle(platform, raw) {
        return Err(ResolveError::InvalidIdentity);
    }
    validate(Identity::new(platform, raw))
}

/// Resolves handles into profiles and derived views.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct Aggregator {
    graph: Arc<dyn GraphQuery>,
    assets: Arc<AssetResolver>,
    batch_concurrency: Option<usize>,
}

impl Aggregator {
    pub fn new(graph: Arc<dyn GraphQuery>, assets: Arc<AssetResolver>) -> Self {
        Self {
            graph,
            assets,
            batch_concurrency: None,
        }
    }

    /// Cap how many batch items are resolved at once
    pub fn with_batch_concurrency(mut self, limit: Option<usize>) -> Self {
        self.batch_concurrency = limit;
        self
    }

    async fn fetch(
        &self,
        kind: QueryKind,
        identity: &Identity,
        auth: &AuthHeaders,
    ) -> Result<GraphResponse> {
        Ok(self
            .graph
            .query(kind, &identity.handle, identity.platform, auth)
            .await?)
    }

    async fn resolve(
        &self,
        kind: QueryKind,
        identity: &Identity,
        order: MergeOrder,
        auth: &AuthHeaders,
    ) -> Result<Vec<ProfileRecord>> {
        match self.fetch(kind, identity, auth).await {
            Ok(graph) => merge(&graph, identity, order, &self.assets).await,
            Err(ResolveError::NotFound) if identity.platform == Platform::Ethereum => {
                debug!(address = %identity.handle, "Address unknown to graph, using fallback");
                Ok(vec![ethereum_fallback(&identity.handle)])
            }
            Err(e) => Err(e),
        }
    }

    /// Every profile linked to the handle, queried identity first
    pub async fn profiles(&self, raw: &str, auth: &AuthHeaders) -> Result<Vec<ProfileRecord>> {
        let identity = prepare_identity(raw)?;
        let order = MergeOrder::for_platform(identity.platform);
        self.resolve(QueryKind::Profile, &identity, order, auth).await
    }

    /// The single profile of the handle on a fixed platform
    pub async fn platform_profile(
        &self,
        platform: Platform,
        raw: &str,
        auth: &AuthHeaders,
    ) -> Result<ProfileRecord> {
        let identity = prepare_platform_identity(platform, raw)?;
        self.resolve(QueryKind::Profile, &identity, MergeOrder::Backend, auth)
            .await?
            .into_iter()
            .next()
            .ok_or(ResolveError::NotFound)
    }

    pub async fn ns(&self, raw: &str, auth: &AuthHeaders) -> Result<Vec<NsRecord>> {
        let profiles = self.profiles(raw, auth).await?;
        Ok(profiles.into_iter().map(NsRecord::from).collect())
    }

    pub async fn platform_ns(
        &self,
        platform: Platform,
        raw: &str,
        auth: &AuthHeaders,
    ) -> Result<NsRecord> {
        Ok(self.platform_profile(platform, raw, auth).await?.into())
    }

    async fn batch_item(&self, raw: &str, auth: &AuthHeaders) -> BatchItem<ProfileRecord> {
        let classified = classify(raw);
        let platform = classified.as_ref().map(|id| id.platform);
        let label = classified
            .as_ref()
            .map(|id| id.handle.clone())
            .unwrap_or_else(|| raw.trim().to_string());

        let result = async {
            let identity = prepare_identity(raw)?;
            self.resolve(QueryKind::Batch, &identity, MergeOrder::Backend, auth)
                .await?
                .into_iter()
                .next()
                .ok_or(ResolveError::NotFound)
        }
        .await;

        match result {
            Ok(profile) => BatchItem::Resolved(profile),
            Err(e) => {
                debug!(id = raw, error = %e, "Batch item failed");
                BatchItem::Failed(ErrorRecord::new(&e, &label, platform))
            }
        }
    }

    /// Resolve many handles at once. Output is positional: item `i` answers
    /// input `i`, and one failure never affects the others.
    pub async fn batch(
        &self,
        ids: &[String],
        auth: &AuthHeaders,
    ) -> Result<Vec<BatchItem<ProfileRecord>>> {
        if ids.is_empty() {
            return Err(ResolveError::InvalidIdentity);
        }

        let futures: Vec<_> = ids
            .iter()
            .map(|raw| async move {
                match AssertUnwindSafe(self.batch_item(raw, auth)).catch_unwind().await {
                    Ok(item) => item,
                    Err(_) => {
                        error!(id = %raw, "Batch item panicked");
                        BatchItem::Failed(ErrorRecord::new(
                            &ResolveError::Upstream {
                                code: 500,
                                message: "Internal Server Error".to_string(),
                            },
                            raw,
                            None,
                        ))
                    }
                }
            })
            .collect();

        let items = settle_all(futures, self.batch_concurrency).await;
        let failed = items.iter().filter(|item| item.is_failed()).count();
        if failed > 0 {
            warn!(total = items.len(), failed, "Batch resolved with failures");
        }
        Ok(items)
    }

    pub async fn ns_batch(
        &self,
        ids: &[String],
        auth: &AuthHeaders,
    ) -> Result<Vec<BatchItem<NsRecord>>> {
        Ok(self
            .batch(ids, auth)
            .await?
            .into_iter()
            .map(|item| item.map(NsRecord::from))
            .collect())
    }

    /// Per-identity credential verdicts across the graph
    pub async fn credentials(
        &self,
        raw: &str,
        auth: &AuthHeaders,
    ) -> Result<Vec<CredentialsRecord>> {
        let identity = prepare_identity(raw)?;
        let graph = self.fetch(QueryKind::Credentials, &identity, auth).await?;

        let records: Vec<CredentialsRecord> =
            ranked_vertices(&graph, &identity, MergeOrder::Backend)
                .into_iter()
                .map(|(platform, vertex)| CredentialsRecord {
                    identity: vertex.identity.clone(),
                    platform,
                    credentials: aggregate([vertex], HumanPolicy::Presence),
                })
                .collect();

        if records.is_empty() {
            return Err(ResolveError::NotFound);
        }
        Ok(records)
    }

    /// Wallet summary: ranked profiles, owned names and graph-wide credentials
    pub async fn wallet(&self, raw: &str, auth: &AuthHeaders) -> Result<WalletRecord> {
        let identity = prepare_identity(raw)?;
        let order = MergeOrder::for_platform(identity.platform);

        let graph = match self.fetch(QueryKind::Wallet, &identity, auth).await {
            Ok(graph) => graph,
            Err(ResolveError::NotFound) if identity.platform == Platform::Ethereum => {
                let fallback = ethereum_fallback(&identity.handle);
                return Ok(WalletRecord {
                    address: fallback.address.clone(),
                    identity: identity.handle,
                    platform: identity.platform,
                    primary: None,
                    domains: Vec::new(),
                    profiles: vec![fallback],
                    credentials: CredentialAggregate::default(),
                });
            }
            Err(e) => return Err(e),
        };

        let profiles = merge(&graph, &identity, order, &self.assets).await?;
        let vertices = ranked_vertices(&graph, &identity, order);

        let domains: Vec<WalletDomain> = vertices
            .iter()
            .filter(|(platform, _)| platform.is_domain_service())
            .map(|(platform, vertex)| WalletDomain {
                identity: vertex.identity.clone(),
                platform: *platform,
                is_primary: vertex.is_primary,
                expired_at: vertex.expired_at.clone(),
            })
            .collect();

        let primary = domains
            .iter()
            .find(|domain| domain.is_primary)
            .and_then(|domain| {
                profiles
                    .iter()
                    .find(|p| p.platform == domain.platform && p.identity == domain.identity)
            })
            .map(NsRecord::from);

        let credentials = aggregate(
            vertices.iter().map(|(_, vertex)| *vertex),
            HumanPolicy::Threshold,
        );

        Ok(WalletRecord {
            address: profiles.first().and_then(|p| p.address.clone()),
            identity: identity.handle,
            platform: identity.platform,
            primary,
            domains,
            profiles,
            credentials,
        })
    }

    /// Registration record of a name-service domain
    pub async fn domain(&self, raw: &str, auth: &AuthHeaders) -> Result<DomainRecord> {
        let identity = prepare_identity(raw)?;
        if !identity.platform.is_domain_service() {
            return Err(ResolveError::InvalidIdentity);
        }
        let graph = self.fetch(QueryKind::Domain, &identity, auth).await?;
        let root = graph.root;
        let profile = root.profile.unwrap_or_default();

        let (avatar, contenthash) = futures::join!(
            self.assets.resolve(profile.avatar.as_deref()),
            self.assets.resolve(profile.contenthash.as_deref()),
        );

        Ok(DomainRecord {
            identity: root.identity,
            platform: identity.platform,
            resolved_address: root.resolved_address.first().map(|a| a.address.clone()),
            owner_address: root.owner_address.first().map(|a| a.address.clone()),
            display_name: profile.display_name.filter(|name| !name.is_empty()),
            avatar,
            description: profile.description,
            contenthash,
            texts: profile.texts.into_iter().collect::<BTreeMap<_, _>>(),
            is_primary: root.is_primary,
            status: root.status,
            created_at: root.created_at,
            updated_at: root.updated_at,
            expired_at: root.expired_at,
        })
    }

    /// Resolved avatar of the handle's own profile
    pub async fn avatar(&self, raw: &str, auth: &AuthHeaders) -> Result<AvatarRecord> {
        let profile = self
            .profiles(raw, auth)
            .await?
            .into_iter()
            .next()
            .ok_or(ResolveError::NotFound)?;
        let avatar = profile.avatar.ok_or(ResolveError::NotFound)?;
        Ok(AvatarRecord {
            identity: profile.identity,
            platform: profile.platform,
            avatar,
        })
    }

    /// Loose lookup; results stay in backend order
    pub async fn search(&self, raw: &str, auth: &AuthHeaders) -> Result<Vec<NsRecord>> {
        let identity = prepare_identity(raw)?;
        let profiles = self
            .resolve(QueryKind::Search, &identity, MergeOrder::Backend, auth)
            .await?;
        Ok(profiles.into_iter().map(NsRecord::from).collect())
    }

    /// Ask the backend to re-crawl the graph, then resolve as usual
    pub async fn refresh(&self, raw: &str, auth: &AuthHeaders) -> Result<Vec<ProfileRecord>> {
        let identity = prepare_identity(raw)?;
        let order = MergeOrder::for_platform(identity.platform);
        self.resolve(QueryKind::Refresh, &identity, order, auth).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use identity_graph_client::{GraphError, IdentityNode};
    use serde_json::json;
    use std::sync::Mutex;

    const VITALIK: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

    /// In-memory identity graph keyed by the queried identity
    #[derive(Default)]
    struct FakeGraph {
        calls: Mutex<Vec<(QueryKind, String, Option<String>)>>,
    }

    fn node(value: serde_json::Value) -> GraphResponse {
        GraphResponse::from_node(serde_json::from_value::<IdentityNode>(value).unwrap())
    }

    #[async_trait]
    impl GraphQuery for FakeGraph {
        async fn query(
            &self,
            kind: QueryKind,
            identity: &str,
            _platform: Platform,
            auth: &AuthHeaders,
        ) -> identity_graph_client::Result<GraphResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((kind, identity.to_string(), auth.api_key.clone()));

            match identity {
                "vitalik.eth" => Ok(node(json!({
                    "platform": "ens",
                    "identity": "vitalik.eth",
                    "isPrimary": true,
                    "ownerAddress": [{"network": "ethereum", "address": VITALIK}],
                    "resolvedAddress": [{"network": "ethereum", "address": VITALIK}],
                    "expiredAt": "2032-05-04T00:00:00Z",
                    "profile": {
                        "displayName": "vitalik.eth",
                        "contenthash": "ipfs://QmSP4nq9fnN9dAiCj42ug9Wa79rqmQerZXZch82VqpiH7U",
                        "texts": {"com.twitter": "VitalikButerin"}
                    },
                    "credentials": [
                        {"category": "isHuman", "dataSource": "talent", "type": "score", "value": 3}
                    ],
                    "identityGraph": {
                        "vertices": [
                            {"platform": "farcaster", "identity": "vitalik.eth",
                             "profile": {"avatar": "https://example.com/v.png"}},
                            {"platform": "ethereum", "identity": VITALIK,
                             "credentials": [
                                {"category": "isHuman", "dataSource": "humanpassport",
                                 "type": "score", "value": 31}
                             ]}
                        ],
                        "edges": []
                    }
                }))),
                "dwr" => Ok(node(json!({
                    "platform": "farcaster",
                    "identity": "dwr",
                    "profile": {"displayName": "Dan Romero"}
                }))),
                "broken.eth" => Err(GraphError::Upstream {
                    code: 502,
                    message: "Bad Gateway".to_string(),
                }),
                "panic.eth" => panic!("fake graph exploded"),
                _ => Err(GraphError::NotFound),
            }
        }
    }

    fn aggregator() -> (Aggregator, Arc<FakeGraph>) {
        let graph = Arc::new(FakeGraph::default());
        let assets = Arc::new(AssetResolver::new(None).unwrap());
        (Aggregator::new(graph.clone(), assets), graph)
    }

    #[test]
    fn test_prepare_identity_rejections() {
        assert_eq!(prepare_identity(""), Err(ResolveError::InvalidIdentity));
        assert_eq!(
            prepare_identity("not-a-real-handle.zzz"),
            Err(ResolveError::InvalidIdentity)
        );
        assert_eq!(
            prepare_identity("0x0000000000000000000000000000000000000000"),
            Err(ResolveError::InvalidIdentity)
        );
        assert_eq!(
            prepare_identity("ethereum,0x000000000000000000000000000000000000dEaD"),
            Err(ResolveError::InvalidIdentity)
        );
        assert_eq!(
            prepare_identity("twitter,jack"),
            Err(ResolveError::InvalidIdentity)
        );
        assert_eq!(
            prepare_identity("VITALIK.ETH").unwrap(),
            Identity::new(Platform::Ens, "vitalik.eth")
        );
    }

    #[test]
    fn test_prepare_platform_identity() {
        assert_eq!(
            prepare_platform_identity(Platform::Farcaster, "dwr.eth").unwrap(),
            Identity::new(Platform::Farcaster, "dwr.eth")
        );
        assert_eq!(
            prepare_platform_identity(Platform::Ens, "farcaster,dwr"),
            Err(ResolveError::InvalidIdentity)
        );
        assert_eq!(
            prepare_platform_identity(Platform::Ens, "dwr"),
            Err(ResolveError::InvalidIdentity)
        );
    }

    #[tokio::test]
    async fn test_profiles_rank_and_forward_auth() {
        let (aggregator, graph) = aggregator();
        let auth = AuthHeaders::with_api_key("caller-key");
        let records = aggregator.profiles("vitalik.eth", &auth).await.unwrap();

        let platforms: Vec<Platform> = records.iter().map(|r| r.platform).collect();
        assert_eq!(
            platforms,
            vec![Platform::Ens, Platform::Farcaster, Platform::Ethereum]
        );
        assert_eq!(records[0].address.as_deref(), Some(VITALIK));
        assert_eq!(records[0].links["twitter"].handle, "VitalikButerin");

        let calls = graph.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, QueryKind::Profile);
        assert_eq!(calls[0].2.as_deref(), Some("caller-key"));
    }

    #[tokio::test]
    async fn test_unknown_address_never_empty() {
        let (aggregator, _) = aggregator();
        let address = "0x1234567890abcdef1234567890abcdef12345678";
        let records = aggregator
            .profiles(address, &AuthHeaders::default())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identity, address);
    }

    #[tokio::test]
    async fn test_invalid_identity_skips_backend() {
        let (aggregator, graph) = aggregator();
        let err = aggregator
            .profiles("not-a-real-handle.zzz", &AuthHeaders::default())
            .await
            .unwrap_err();
        assert_eq!(err, ResolveError::InvalidIdentity);
        assert!(graph.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_is_preserved() {
        let (aggregator, _) = aggregator();
        let err = aggregator
            .profiles("broken.eth", &AuthHeaders::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn test_platform_profile() {
        let (aggregator, _) = aggregator();
        let record = aggregator
            .platform_profile(Platform::Farcaster, "dwr", &AuthHeaders::default())
            .await
            .unwrap();
        assert_eq!(record.identity, "dwr");
        assert_eq!(record.display_name.as_deref(), Some("Dan Romero"));

        let ns = aggregator
            .platform_ns(Platform::Farcaster, "dwr", &AuthHeaders::default())
            .await
            .unwrap();
        assert_eq!(ns.display_name.as_deref(), Some("Dan Romero"));
    }

    #[tokio::test]
    async fn test_batch_is_positional_and_isolated() {
        let (aggregator, graph) = aggregator();
        let ids: Vec<String> = [
            "vitalik.eth",
            "not-a-real-handle.zzz",
            "panic.eth",
            "farcaster,dwr",
            "broken.eth",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let items = aggregator
            .batch(&ids, &AuthHeaders::default())
            .await
            .unwrap();
        assert_eq!(items.len(), 5);

        match &items[0] {
            BatchItem::Resolved(p) => assert_eq!(p.identity, "vitalik.eth"),
            other => panic!("unexpected {other:?}"),
        }
        match &items[1] {
            BatchItem::Failed(e) => {
                assert_eq!(e.identity, "not-a-real-handle.zzz");
                assert_eq!(e.error, "Invalid Identity or Domain");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(items[2].is_failed());
        match &items[3] {
            BatchItem::Resolved(p) => assert_eq!(p.platform, Platform::Farcaster),
            other => panic!("unexpected {other:?}"),
        }
        match &items[4] {
            BatchItem::Failed(e) => assert_eq!(e.code, 502),
            other => panic!("unexpected {other:?}"),
        }

        let calls = graph.calls.lock().unwrap();
        assert!(calls.iter().all(|(kind, _, _)| *kind == QueryKind::Batch));
    }

    #[tokio::test]
    async fn test_batch_runs_on_spawned_task() {
        let (aggregator, _) = aggregator();
        let aggregator = Arc::new(aggregator);
        let ids = vec!["farcaster,dwr".to_string(), "panic.eth".to_string()];

        // Handlers run on the multi-threaded runtime, so the batch future
        // has to be Send across every borrow it holds.
        let items = tokio::spawn(async move {
            aggregator.batch(&ids, &AuthHeaders::default()).await
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(items.len(), 2);
        assert!(!items[0].is_failed());
        assert!(items[1].is_failed());
    }

    #[tokio::test]
    async fn test_empty_batch_is_invalid() {
        let (aggregator, _) = aggregator();
        let err = aggregator
            .batch(&[], &AuthHeaders::default())
            .await
            .unwrap_err();
        assert_eq!(err, ResolveError::InvalidIdentity);
    }

    #[tokio::test]
    async fn test_credentials_per_identity() {
        let (aggregator, _) = aggregator();
        let records = aggregator
            .credentials("vitalik.eth", &AuthHeaders::default())
            .await
            .unwrap();
        assert_eq!(records[0].platform, Platform::Ens);
        let ens_human = records[0].credentials.is_human.as_ref().unwrap();
        assert!(ens_human.value);
        let farcaster = records
            .iter()
            .find(|r| r.platform == Platform::Farcaster)
            .unwrap();
        assert!(farcaster.credentials.is_empty());
    }

    #[tokio::test]
    async fn test_wallet_uses_threshold_policy() {
        let (aggregator, _) = aggregator();
        let wallet = aggregator
            .wallet("vitalik.eth", &AuthHeaders::default())
            .await
            .unwrap();

        assert_eq!(wallet.address.as_deref(), Some(VITALIK));
        assert_eq!(wallet.domains.len(), 2);
        assert!(wallet.domains[0].is_primary);
        assert_eq!(
            wallet.primary.as_ref().map(|p| p.identity.as_str()),
            Some("vitalik.eth")
        );
        let human = wallet.credentials.is_human.unwrap();
        assert!(human.value);
        assert_eq!(human.sources.len(), 2);
    }

    #[tokio::test]
    async fn test_domain_requires_name_service() {
        let (aggregator, _) = aggregator();
        let domain = aggregator
            .domain("vitalik.eth", &AuthHeaders::default())
            .await
            .unwrap();
        assert_eq!(domain.owner_address.as_deref(), Some(VITALIK));
        assert_eq!(
            domain.contenthash.as_deref(),
            Some("https://ipfs.io/ipfs/QmSP4nq9fnN9dAiCj42ug9Wa79rqmQerZXZch82VqpiH7U")
        );
        assert_eq!(domain.texts["com.twitter"], "VitalikButerin");

        let err = aggregator
            .domain(VITALIK, &AuthHeaders::default())
            .await
            .unwrap_err();
        assert_eq!(err, ResolveError::InvalidIdentity);
    }

    #[tokio::test]
    async fn test_avatar_missing_is_not_found() {
        let (aggregator, _) = aggregator();
        let err = aggregator
            .avatar("vitalik.eth", &AuthHeaders::default())
            .await
            .unwrap_err();
        assert_eq!(err, ResolveError::NotFound);
    }

    #[tokio::test]
    async fn test_search_and_refresh_use_their_query_kinds() {
        let (aggregator, graph) = aggregator();
        let auth = AuthHeaders::default();
        aggregator.search("vitalik.eth", &auth).await.unwrap();
        aggregator.refresh("vitalik.eth", &auth).await.unwrap();

        let kinds: Vec<QueryKind> = graph.calls.lock().unwrap().iter().map(|c| c.0).collect();
        assert_eq!(kinds, vec![QueryKind::Search, QueryKind::Refresh]);
    }
}
