//! Public records produced by the aggregation engine

use handle_classifier::Platform;
use identity_graph_client::CredentialRecord;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::ErrorRecord;

/// Link to an off-chain account, tagged with every source that attested it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRecord {
    pub link: Option<String>,
    pub handle: String,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialRecord {
    pub uid: Option<String>,
    pub follower: u64,
    pub following: u64,
    pub updated_at: Option<String>,
}

/// Unified profile for one identity on one platform
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub address: Option<String>,
    pub identity: String,
    pub platform: Platform,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub header: Option<String>,
    pub contenthash: Option<String>,
    pub links: BTreeMap<String, LinkRecord>,
    pub social: Option<SocialRecord>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ProfileRecord {
    /// Minimal record: nothing but the identity
    pub fn bare(platform: Platform, identity: &str) -> Self {
        Self {
            address: None,
            identity: identity.to_string(),
            platform,
            display_name: None,
            avatar: None,
            description: None,
            email: None,
            location: None,
            header: None,
            contenthash: None,
            links: BTreeMap::new(),
            social: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Name-service projection of a profile
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NsRecord {
    pub address: Option<String>,
    pub identity: String,
    pub platform: Platform,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub description: Option<String>,
}

impl From<&ProfileRecord> for NsRecord {
    fn from(profile: &ProfileRecord) -> Self {
        Self {
            address: profile.address.clone(),
            identity: profile.identity.clone(),
            platform: profile.platform,
            display_name: profile.display_name.clone(),
            avatar: profile.avatar.clone(),
            description: profile.description.clone(),
        }
    }
}

impl From<ProfileRecord> for NsRecord {
    fn from(profile: ProfileRecord) -> Self {
        NsRecord::from(&profile)
    }
}

/// Registration facts of a name-service domain
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    pub identity: String,
    pub platform: Platform,
    pub resolved_address: Option<String>,
    pub owner_address: Option<String>,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub description: Option<String>,
    pub contenthash: Option<String>,
    pub texts: BTreeMap<String, String>,
    pub is_primary: bool,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub expired_at: Option<String>,
}

/// Aggregated verdict for one credential category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CredentialSummary {
    pub value: bool,
    pub sources: Vec<CredentialRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialAggregate {
    pub is_human: Option<CredentialSummary>,
    pub is_risky: Option<CredentialSummary>,
    pub is_spam: Option<CredentialSummary>,
}

impl CredentialAggregate {
    pub fn is_empty(&self) -> bool {
        self.is_human.is_none() && self.is_risky.is_none() && self.is_spam.is_none()
    }
}

/// Credentials of one identity in the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CredentialsRecord {
    pub identity: String,
    pub platform: Platform,
    pub credentials: CredentialAggregate,
}

/// Name owned by or resolving to a wallet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDomain {
    pub identity: String,
    pub platform: Platform,
    pub is_primary: bool,
    pub expired_at: Option<String>,
}

/// Wallet summary: ranked profiles, owned names, graph-wide credentials
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub address: Option<String>,
    pub identity: String,
    pub platform: Platform,
    pub primary: Option<NsRecord>,
    pub domains: Vec<WalletDomain>,
    pub profiles: Vec<ProfileRecord>,
    pub credentials: CredentialAggregate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvatarRecord {
    pub identity: String,
    pub platform: Platform,
    pub avatar: String,
}

/// One positional batch result; failures keep their slot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchItem<T> {
    Resolved(T),
    Failed(ErrorRecord),
}

impl<T> BatchItem<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, BatchItem::Failed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> BatchItem<U> {
        match self {
            BatchItem::Resolved(value) => BatchItem::Resolved(f(value)),
            BatchItem::Failed(err) => BatchItem::Failed(err),
        }
    }
}
