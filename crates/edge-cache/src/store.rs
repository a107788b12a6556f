//! Cache store abstraction and the in-process moka store

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use moka::future::Cache;
use moka::Expiry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::Result;

/// A stored origin response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub body: Vec<u8>,
    pub status: u16,
    pub content_type: String,
    pub ttl_seconds: u64,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        key: impl Into<String>,
        body: Vec<u8>,
        content_type: &str,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            key: key.into(),
            body,
            status: 200,
            content_type: content_type.to_string(),
            ttl_seconds,
            stored_at: Utc::now(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(ChronoDuration::try_seconds)
            .and_then(|ttl| self.stored_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Seconds of freshness left, for `Cache-Control: max-age`
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u64 {
        (self.expires_at() - now).num_seconds().max(0) as u64
    }
}

/// Key/value store for cached responses
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;
    async fn put(&self, entry: CacheEntry) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    /// Approximate number of live entries
    fn entry_count(&self) -> u64;
}

/// Expires each entry after its own TTL
struct EntryTtl;

impl Expiry<String, Arc<CacheEntry>> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Arc<CacheEntry>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(Duration::from_secs(value.ttl_seconds))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Arc<CacheEntry>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(Duration::from_secs(value.ttl_seconds))
    }
}

/// In-process store bounded by entry count
pub struct MokaStore {
    cache: Cache<String, Arc<CacheEntry>>,
}

impl MokaStore {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryTtl)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl CacheStore for MokaStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let Some(entry) = self.cache.get(key).await else {
            return Ok(None);
        };
        if entry.is_expired(Utc::now()) {
            debug!(key, "Dropping expired cache entry");
            self.cache.invalidate(key).await;
            return Ok(None);
        }
        Ok(Some(entry.as_ref().clone()))
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.cache.insert(entry.key.clone(), Arc::new(entry)).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}
