//! Identity Aggregator
//!
//! Turns an identity graph answer into unified profiles: filters vertices to
//! the platforms this service resolves, ranks them (queried identity first),
//! deduplicates, derives social links, resolves assets and aggregates
//! credentials. Batch lookups fan out concurrently and settle positionally.

mod batch;
mod credentials;
mod engine;
mod error;
mod links;
mod merge;
mod types;

pub use batch::{parse_batch_ids, settle_all};
pub use credentials::{aggregate, aggregate_records, parse_credentials, HumanPolicy};
pub use engine::{prepare_identity, prepare_platform_identity, Aggregator};
pub use error::{ErrorRecord, ResolveError, Result};
pub use links::derive_links;
pub use merge::{ethereum_fallback, merge, priority_list, MergeOrder};
pub use types::{
    AvatarRecord, BatchItem, CredentialAggregate, CredentialSummary, CredentialsRecord,
    DomainRecord, LinkRecord, NsRecord, ProfileRecord, SocialRecord, WalletDomain, WalletRecord,
};
