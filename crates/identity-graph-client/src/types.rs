//! Wire types of the identity graph service

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept strings, numbers and booleans as a string value
fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    #[serde(default)]
    pub network: Option<String>,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSocial {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub follower: Option<u64>,
    #[serde(default)]
    pub following: Option<u64>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Profile payload attached to a vertex by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProfile {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contenthash: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub texts: HashMap<String, String>,
    #[serde(default)]
    pub social: Option<RawSocial>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One platform-specific node of the identity graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityGraphVertex {
    #[serde(default)]
    pub id: String,
    /// Kept as the backend's string; platforms this service does not know are
    /// still valid graph members
    pub platform: String,
    pub identity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_primary: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner_address: Vec<AddressRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resolved_address: Vec<AddressRecord>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub expired_at: Option<String>,
    #[serde(default)]
    pub profile: Option<RawProfile>,
    /// Left untyped so one malformed record cannot fail the whole graph
    #[serde(default, deserialize_with = "null_as_default")]
    pub credentials: Vec<serde_json::Value>,
}

impl IdentityGraphVertex {
    /// `platform,identity` id used by edges
    pub fn graph_id(&self) -> String {
        if self.id.is_empty() {
            format!("{},{}", self.platform, self.identity)
        } else {
            self.id.clone()
        }
    }
}

/// Provenance-tagged relation between two vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityGraphEdge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub data_source: String,
    #[serde(default)]
    pub edge_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityGraph {
    #[serde(default)]
    pub graph_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vertices: Vec<IdentityGraphVertex>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub edges: Vec<IdentityGraphEdge>,
}

/// The queried identity plus its surrounding graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityNode {
    #[serde(flatten)]
    pub vertex: IdentityGraphVertex,
    #[serde(default)]
    pub identity_graph: Option<IdentityGraph>,
}

/// Credential category as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialCategory {
    #[serde(rename = "isHuman")]
    IsHuman,
    #[serde(rename = "isRisky")]
    IsRisky,
    #[serde(rename = "isSpam")]
    IsSpam,
}

/// One credential attached to a vertex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    pub category: CredentialCategory,
    #[serde(default)]
    pub data_source: String,
    #[serde(rename = "type", default)]
    pub credential_type: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub value: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub expired_at: Option<String>,
}

/// Normalized graph returned by every query kind
#[derive(Debug, Clone)]
pub struct GraphResponse {
    /// The vertex the query was issued for
    pub root: IdentityGraphVertex,
    /// All vertices in backend order; always contains the root
    pub vertices: Vec<IdentityGraphVertex>,
    pub edges: Vec<IdentityGraphEdge>,
}

impl GraphResponse {
    pub fn from_node(node: IdentityNode) -> Self {
        let IdentityNode {
            vertex: root,
            identity_graph,
        } = node;
        let graph = identity_graph.unwrap_or_default();

        let mut vertices = graph.vertices;
        let has_root = vertices
            .iter()
            .any(|v| v.platform == root.platform && v.identity == root.identity);
        if !has_root {
            vertices.insert(0, root.clone());
        }

        Self {
            root,
            vertices,
            edges: graph.edges,
        }
    }
}

/// Response envelope of the GraphQL endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub(crate) data: Option<EnvelopeData>,
    #[serde(default)]
    pub(crate) errors: Option<Vec<GraphQlError>>,
    #[serde(default)]
    pub(crate) code: Option<u16>,
    #[serde(default)]
    pub(crate) msg: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeData {
    #[serde(default)]
    pub(crate) identity: Option<IdentityNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlErrorExtensions {
    #[serde(default)]
    pub(crate) code: Option<u16>,
}
