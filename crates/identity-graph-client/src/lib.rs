//! Identity Graph Client
//!
//! Issues single-attempt GraphQL queries against the identity graph service
//! and normalizes every answer into a vertex/edge [`GraphResponse`].

mod client;
mod error;
mod query;
mod types;

pub use client::{AuthHeaders, GraphClient, GraphQuery, DEFAULT_GRAPH_URL};
pub use error::{GraphError, Result};
pub use query::QueryKind;
pub use types::{
    AddressRecord, CredentialCategory, CredentialRecord, GraphResponse, IdentityGraph,
    IdentityGraphEdge, IdentityGraphVertex, IdentityNode, RawProfile, RawSocial,
};
