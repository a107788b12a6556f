//! Handle Classifier
//!
//! Turns a human-supplied handle (`vitalik.eth`, `0xd8dA…`, `ens,sujiyan.eth`)
//! into a canonical `(platform, identity)` pair using a fixed, ordered
//! pattern table.

mod classify;
mod platform;

pub use classify::{
    accepts_handle, classify, infer_platform, is_burn_address, is_valid_ethereum_address,
    normalize_handle, truncate_address, Identity, CLASSIFICATION_ORDER, FALLBACK_PLATFORM,
};
pub use platform::{Platform, PlatformDescriptor, UnknownPlatform};
