//! Query kinds and their GraphQL documents

use handle_classifier::Platform;
use serde_json::{json, Value};
use std::fmt;

/// Selects the upstream query shape. Every kind answers with the same
/// `identity { …, identityGraph { vertices, edges } }` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Profile,
    Domain,
    Credentials,
    Batch,
    Search,
    Wallet,
    Refresh,
}

const VERTEX_FIELDS: &str = r#"
    id
    platform
    identity
    isPrimary
    status
    createdAt
    updatedAt
    expiredAt
    ownerAddress { network address }
    resolvedAddress { network address }"#;

const PROFILE_FIELDS: &str = r#"
    profile {
      uid
      identity
      platform
      network
      address
      displayName
      avatar
      description
      contenthash
      texts
      social { uid follower following updatedAt }
      createdAt
      updatedAt
    }"#;

const CREDENTIAL_FIELDS: &str = r#"
    credentials {
      id
      platform
      category
      dataSource
      type
      value
      link
      updatedAt
      expiredAt
    }"#;

const EDGE_FIELDS: &str = "edges { source target dataSource edgeType }";

impl QueryKind {
    pub fn name(self) -> &'static str {
        match self {
            QueryKind::Profile => "profile",
            QueryKind::Domain => "domain",
            QueryKind::Credentials => "credentials",
            QueryKind::Batch => "batch",
            QueryKind::Search => "search",
            QueryKind::Wallet => "wallet",
            QueryKind::Refresh => "refresh",
        }
    }

    /// GraphQL document sent for this kind
    pub fn document(self) -> String {
        let (operation, args, root_extra, vertex_extra, with_edges) = match self {
            QueryKind::Profile => (
                "QUERY_PROFILE",
                "(platform: $platform, identity: $identity)",
                PROFILE_FIELDS,
                PROFILE_FIELDS,
                true,
            ),
            QueryKind::Domain => (
                "QUERY_DOMAIN",
                "(platform: $platform, identity: $identity)",
                PROFILE_FIELDS,
                "",
                false,
            ),
            QueryKind::Credentials => (
                "QUERY_CREDENTIALS",
                "(platform: $platform, identity: $identity)",
                CREDENTIAL_FIELDS,
                CREDENTIAL_FIELDS,
                false,
            ),
            QueryKind::Batch => ("QUERY_BATCH", "(id: $id)", PROFILE_FIELDS, "", false),
            QueryKind::Search => (
                "QUERY_SEARCH",
                "(platform: $platform, identity: $identity, search: true)",
                PROFILE_FIELDS,
                PROFILE_FIELDS,
                false,
            ),
            QueryKind::Wallet => (
                "QUERY_WALLET",
                "(platform: $platform, identity: $identity)",
                PROFILE_FIELDS,
                "",
                true,
            ),
            QueryKind::Refresh => (
                "QUERY_REFRESH",
                "(platform: $platform, identity: $identity, refresh: true)",
                PROFILE_FIELDS,
                PROFILE_FIELDS,
                true,
            ),
        };

        // Wallet needs credentials on every owned vertex on top of profiles
        let vertex_extra = if self == QueryKind::Wallet {
            format!("{PROFILE_FIELDS}{CREDENTIAL_FIELDS}")
        } else {
            vertex_extra.to_string()
        };
        let edges = if with_edges { EDGE_FIELDS } else { "" };
        let params = if self == QueryKind::Batch {
            "($id: String!)"
        } else {
            "($platform: Platform!, $identity: String!)"
        };

        format!(
            "query {operation}{params} {{
  identity{args} {{{VERTEX_FIELDS}{root_extra}
    identityGraph {{
      graphId
      vertices {{{VERTEX_FIELDS}{vertex_extra}
      }}
      {edges}
    }}
  }}
}}"
        )
    }

    /// Variables object for this kind
    pub fn variables(self, identity: &str, platform: Platform) -> Value {
        match self {
            QueryKind::Batch => json!({ "id": format!("{},{}", platform.key(), identity) }),
            _ => json!({ "identity": identity, "platform": platform.key() }),
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
