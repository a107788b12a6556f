//! Graph merge: filter, rank, deduplicate and enrich vertices into profiles

use asset_resolver::AssetResolver;
use futures::future::join_all;
use handle_classifier::{normalize_handle, truncate_address, Identity, Platform};
use identity_graph_client::{GraphResponse, IdentityGraphEdge, IdentityGraphVertex};
use std::collections::HashSet;
use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::links::derive_links;
use crate::types::{ProfileRecord, SocialRecord};

/// How vertices after the queried one are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOrder {
    /// Platform priority list, queried platform promoted to the top
    Priority,
    /// Backend order, untouched
    Backend,
}

impl MergeOrder {
    /// Default ordering for a queried platform. Solana-family and .bit
    /// graphs keep backend order.
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Dotbit | Platform::Sns | Platform::Solana => MergeOrder::Backend,
            _ => MergeOrder::Priority,
        }
    }
}

/// Ranked platforms, lowest rank first
pub fn priority_list() -> Vec<Platform> {
    let mut ranked: Vec<(u8, Platform)> = Platform::ALL
        .iter()
        .filter_map(|p| p.descriptor().rank.map(|rank| (rank, *p)))
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, p)| p).collect()
}

struct Candidate<'a> {
    platform: Platform,
    vertex: &'a IdentityGraphVertex,
}

/// Fetchable vertices in backend order, first occurrence of each
/// `(platform, identity)` kept
fn candidates(graph: &GraphResponse) -> Vec<Candidate<'_>> {
    let mut seen = HashSet::new();
    graph
        .vertices
        .iter()
        .filter_map(|vertex| {
            let platform = vertex.platform.parse::<Platform>().ok()?;
            if !platform.is_fetchable() {
                return None;
            }
            let key = (platform, normalize_handle(platform, &vertex.identity));
            seen.insert(key).then_some(Candidate { platform, vertex })
        })
        .collect()
}

fn is_queried(candidate: &Candidate<'_>, queried: &Identity) -> bool {
    candidate.platform == queried.platform
        && normalize_handle(candidate.platform, &candidate.vertex.identity) == queried.handle
}

fn rank<'a>(
    candidates: Vec<Candidate<'a>>,
    queried: &Identity,
    order: MergeOrder,
) -> Vec<Candidate<'a>> {
    let (mut ordered, rest): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(|c| is_queried(c, queried));

    match order {
        MergeOrder::Backend => ordered.extend(rest),
        MergeOrder::Priority => {
            let mut priority = priority_list();
            if let Some(pos) = priority.iter().position(|p| *p == queried.platform) {
                let own = priority.remove(pos);
                priority.insert(0, own);
            }
            let mut rest: Vec<Option<Candidate<'a>>> = rest.into_iter().map(Some).collect();
            for platform in &priority {
                for slot in rest.iter_mut() {
                    if slot.as_ref().is_some_and(|c| c.platform == *platform) {
                        ordered.extend(slot.take());
                    }
                }
            }
            ordered.extend(rest.into_iter().flatten());
        }
    }
    ordered
}

/// Fetchable vertices in merge order, without building records
pub(crate) fn ranked_vertices<'a>(
    graph: &'a GraphResponse,
    queried: &Identity,
    order: MergeOrder,
) -> Vec<(Platform, &'a IdentityGraphVertex)> {
    rank(candidates(graph), queried, order)
        .into_iter()
        .map(|c| (c.platform, c.vertex))
        .collect()
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

async fn build_record(
    candidate: &Candidate<'_>,
    edges: &[IdentityGraphEdge],
    assets: &AssetResolver,
) -> ProfileRecord {
    let Candidate { platform, vertex } = candidate;
    let platform = *platform;
    let profile = vertex.profile.clone().unwrap_or_default();
    let texts = &profile.texts;

    let address = if platform.is_address() {
        Some(vertex.identity.clone())
    } else {
        non_empty(profile.address.as_ref())
            .or_else(|| vertex.resolved_address.first().map(|a| a.address.clone()))
            .or_else(|| vertex.owner_address.first().map(|a| a.address.clone()))
    };

    let display_name = non_empty(profile.display_name.as_ref()).or_else(|| {
        Some(if platform.is_address() {
            truncate_address(&vertex.identity)
        } else {
            vertex.identity.clone()
        })
    });

    let avatar_source =
        non_empty(profile.avatar.as_ref()).or_else(|| non_empty(texts.get("avatar")));
    let header_source = non_empty(texts.get("header")).or_else(|| non_empty(texts.get("banner")));
    let contenthash_source = non_empty(profile.contenthash.as_ref());
    let (avatar, header, contenthash) = futures::join!(
        assets.resolve(avatar_source.as_deref()),
        assets.resolve(header_source.as_deref()),
        assets.resolve(contenthash_source.as_deref()),
    );

    let social = profile.social.as_ref().map(|s| SocialRecord {
        uid: s.uid.clone(),
        follower: s.follower.unwrap_or(0),
        following: s.following.unwrap_or(0),
        updated_at: s.updated_at.clone(),
    });

    ProfileRecord {
        address,
        identity: vertex.identity.clone(),
        platform,
        display_name,
        avatar,
        description: non_empty(profile.description.as_ref())
            .or_else(|| non_empty(texts.get("description"))),
        email: non_empty(texts.get("email")),
        location: non_empty(texts.get("location")),
        header,
        contenthash,
        links: derive_links(vertex, platform, texts, edges),
        social,
        created_at: profile.created_at.clone().or_else(|| vertex.created_at.clone()),
        updated_at: profile.updated_at.clone().or_else(|| vertex.updated_at.clone()),
    }
}

/// Record synthesized for an address the graph knows nothing about
pub fn ethereum_fallback(address: &str) -> ProfileRecord {
    let address = address.to_lowercase();
    let mut record = ProfileRecord::bare(Platform::Ethereum, &address);
    record.display_name = Some(truncate_address(&address));
    record.address = Some(address);
    record
}

/// Merge a graph into profile records.
///
/// The queried identity's record is always first. An Ethereum query whose
/// address no record carries gets a synthesized record prepended, so it never
/// yields an empty list; anything else with no fetchable vertex is `NotFound`.
pub async fn merge(
    graph: &GraphResponse,
    queried: &Identity,
    order: MergeOrder,
    assets: &AssetResolver,
) -> Result<Vec<ProfileRecord>> {
    let ranked = rank(candidates(graph), queried, order);

    let mut records = join_all(
        ranked
            .iter()
            .map(|candidate| build_record(candidate, &graph.edges, assets)),
    )
    .await;

    let address_known = records.iter().any(|r| {
        r.address
            .as_deref()
            .is_some_and(|a| a.eq_ignore_ascii_case(&queried.handle))
    });
    if queried.platform == Platform::Ethereum && !address_known {
        records.insert(0, ethereum_fallback(&queried.handle));
    }

    debug!(
        queried = %queried,
        vertices = graph.vertices.len(),
        records = records.len(),
        "Merged identity graph"
    );

    if records.is_empty() {
        return Err(ResolveError::NotFound);
    }
    Ok(records)
}
