//! Social link derivation from profile texts and graph edges

use handle_classifier::{normalize_handle, Platform};
use identity_graph_client::{IdentityGraphEdge, IdentityGraphVertex};
use std::collections::{BTreeMap, HashMap};

use crate::types::LinkRecord;

/// Text record keys that name an off-chain account
const TEXT_LINK_KEYS: [(&str, Platform); 8] = [
    ("com.twitter", Platform::Twitter),
    ("com.github", Platform::Github),
    ("url", Platform::Website),
    ("org.telegram", Platform::Telegram),
    ("com.discord", Platform::Discord),
    ("com.reddit", Platform::Reddit),
    ("com.linkedin", Platform::Linkedin),
    ("com.instagram", Platform::Instagram),
];

/// Reduce a text value (`@jack`, `https://x.com/jack`) to a bare handle
fn text_handle(platform: Platform, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if platform == Platform::Website {
        return Some(value.trim_end_matches('/').to_string());
    }
    let last = value
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(value)
        .trim_start_matches('@');
    (!last.is_empty()).then(|| last.to_string())
}

fn add_link(
    links: &mut BTreeMap<String, LinkRecord>,
    platform: Platform,
    handle: String,
    source: &str,
) {
    let entry = links
        .entry(platform.key().to_string())
        .or_insert_with(|| LinkRecord {
            link: platform.profile_link(&handle),
            handle,
            sources: Vec::new(),
        });
    if !source.is_empty() && !entry.sources.iter().any(|s| s == source) {
        entry.sources.push(source.to_string());
    }
}

/// Links of one vertex, keyed by platform.
///
/// The vertex's own account comes first, then text records (sourced by the
/// vertex platform), then web2 neighbours in the graph (sourced by the edge).
pub fn derive_links(
    vertex: &IdentityGraphVertex,
    platform: Platform,
    texts: &HashMap<String, String>,
    edges: &[IdentityGraphEdge],
) -> BTreeMap<String, LinkRecord> {
    let mut links = BTreeMap::new();

    if !platform.is_address() && platform.descriptor().link_template.is_some() {
        add_link(&mut links, platform, vertex.identity.clone(), platform.key());
    }

    for (key, linked) in TEXT_LINK_KEYS {
        if let Some(handle) = texts.get(key).and_then(|v| text_handle(linked, v)) {
            add_link(&mut links, linked, handle, platform.key());
        }
    }

    let own_id = vertex.graph_id();
    for edge in edges {
        let other = if edge.source == own_id {
            &edge.target
        } else if edge.target == own_id {
            &edge.source
        } else {
            continue;
        };
        let Some((other_platform, other_identity)) = other.split_once(',') else {
            continue;
        };
        let Ok(other_platform) = other_platform.parse::<Platform>() else {
            continue;
        };
        if !other_platform.is_web2() || other_identity.is_empty() {
            continue;
        }
        let handle = normalize_handle(other_platform, other_identity);
        add_link(&mut links, other_platform, handle, &edge.data_source);
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(platform: &str, identity: &str) -> IdentityGraphVertex {
        serde_json::from_value(serde_json::json!({
            "platform": platform,
            "identity": identity,
        }))
        .unwrap()
    }

    fn edge(source: &str, target: &str, data_source: &str) -> IdentityGraphEdge {
        IdentityGraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            data_source: data_source.to_string(),
            edge_type: "Proof".to_string(),
        }
    }

    #[test]
    fn test_text_records_become_links() {
        let texts = HashMap::from([
            ("com.twitter".to_string(), "@VitalikButerin".to_string()),
            ("com.github".to_string(), "https://github.com/vbuterin/".to_string()),
            ("url".to_string(), "https://vitalik.ca".to_string()),
            ("avatar".to_string(), "ignored".to_string()),
        ]);
        let links = derive_links(&vertex("ens", "vitalik.eth"), Platform::Ens, &texts, &[]);

        assert_eq!(links["twitter"].handle, "VitalikButerin");
        assert_eq!(
            links["twitter"].link.as_deref(),
            Some("https://x.com/VitalikButerin")
        );
        assert_eq!(links["twitter"].sources, vec!["ens"]);
        assert_eq!(links["github"].handle, "vbuterin");
        assert_eq!(links["website"].handle, "https://vitalik.ca");
        assert!(!links.contains_key("avatar"));
    }

    #[test]
    fn test_own_account_link() {
        let links = derive_links(
            &vertex("farcaster", "dwr"),
            Platform::Farcaster,
            &HashMap::new(),
            &[],
        );
        assert_eq!(links["farcaster"].handle, "dwr");
        assert_eq!(links["farcaster"].sources, vec!["farcaster"]);

        let address = derive_links(
            &vertex("ethereum", "0xd8da6bf26964af9d7eed9e03e53415d37aa96045"),
            Platform::Ethereum,
            &HashMap::new(),
            &[],
        );
        assert!(address.is_empty());
    }

    #[test]
    fn test_edges_add_sources_without_duplicates() {
        let texts = HashMap::from([("com.twitter".to_string(), "dwr".to_string())]);
        let edges = [
            edge("farcaster,dwr", "twitter,dwr", "nextid"),
            edge("twitter,dwr", "farcaster,dwr", "nextid"),
            edge("github,danromero", "farcaster,dwr", "keybase"),
            edge("ens,dwr.eth", "twitter,someone", "nextid"),
            edge("farcaster,dwr", "ethereum,0x1", "farcaster"),
        ];
        let links = derive_links(
            &vertex("farcaster", "dwr"),
            Platform::Farcaster,
            &texts,
            &edges,
        );

        assert_eq!(links["twitter"].sources, vec!["farcaster", "nextid"]);
        assert_eq!(links["github"].handle, "danromero");
        assert_eq!(links["github"].sources, vec!["keybase"]);
        assert!(!links.contains_key("ethereum"));
        assert_eq!(links.len(), 3);
    }
}
