//! Edge Cache
//!
//! Building blocks of the response cache in front of the profile API: a
//! [`CacheStore`] abstraction with an in-process moka implementation,
//! path-derived TTL tiers, a per-IP fixed-window rate limiter and HS256 API
//! key verification.

mod auth;
mod error;
mod policy;
mod rate_limit;
mod store;

pub use auth::{ApiKeyClaims, ApiKeyVerifier};
pub use error::{AuthError, CacheError, Result};
pub use policy::{
    cache_control, cache_key, is_avatar_path, ttl_for_path, DEFAULT_TTL_SECS, NO_STORE, TTL_TIERS,
};
pub use rate_limit::{RateDecision, RateLimiter};
pub use store::{CacheEntry, CacheStore, MokaStore};
