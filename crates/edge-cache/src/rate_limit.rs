//! Fixed-window request limiter keyed by client address

use moka::future::Cache;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Outcome of one rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
}

/// Counts requests per key in a window that starts at the key's first
/// request. Counters live in memory only.
pub struct RateLimiter {
    windows: Cache<String, Arc<AtomicU32>>,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let windows = Cache::builder()
            .max_capacity(100_000)
            .time_to_live(window)
            .build();
        Self {
            windows,
            max_requests,
        }
    }

    /// Record a request for `key` and decide whether it may proceed
    pub async fn check(&self, key: &str) -> RateDecision {
        let counter = self
            .windows
            .get_with(key.to_string(), async { Arc::new(AtomicU32::new(0)) })
            .await;
        let count = counter.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        let allowed = count <= self.max_requests;
        if !allowed {
            debug!(key, count, limit = self.max_requests, "Rate limit exceeded");
        }
        RateDecision {
            allowed,
            limit: self.max_requests,
        }
    }
}
