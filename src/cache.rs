//! TTL cache of finished research results.
//!
//! Keyed by a short SHA-256 digest of `(topic, depth, academic)` with the
//! topic lowercased and trimmed, so `"Rust "` and `"rust"` share an entry.
//! Capacity and TTL come from [`CacheConfig`]; eviction is handled by
//! [`moka`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::CacheConfig;
use crate::pipeline::Depth;
use crate::progress::ResearchResult;

/// A cached result with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored result.
    pub result: ResearchResult,
    /// When the entry was written.
    pub cached_at: DateTime<Utc>,
    /// Key the entry is stored under.
    pub cache_key: String,
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Live entries.
    pub size: u64,
    /// Capacity.
    pub max_size: u64,
    /// Entry lifetime in hours.
    pub ttl_hours: f64,
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// `hits + misses`.
    pub total_requests: u64,
    /// Hits as a percentage of lookups, 0 when there were none.
    pub hit_rate_percent: f64,
}

/// Cache of research results shared across concurrent runs.
pub struct ResultCache {
    entries: Cache<String, CacheEntry>,
    max_size: u64,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Derive the cache key for a request.
pub fn cache_key(topic: &str, depth: Depth, include_academic: bool) -> String {
    let normalised = topic.trim().to_lowercase();
    let digest = Sha256::digest(format!("{normalised}:{}:{include_academic}", depth.as_str()));
    digest
        .iter()
        .take(8)
        .map(|b| format!("{b:02x}"))
        .collect()
}

impl ResultCache {
    /// Create a cache sized and timed from `config`.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_ttl(config.max_entries, Duration::from_secs(config.ttl_hours * 3600))
    }

    /// Create a cache with an explicit capacity and TTL.
    pub fn with_ttl(max_entries: u64, ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self {
            entries,
            max_size: max_entries,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a result. Every call counts as a hit or a miss.
    pub async fn get(
        &self,
        topic: &str,
        depth: Depth,
        include_academic: bool,
    ) -> Option<CacheEntry> {
        let key = cache_key(topic, depth, include_academic);
        match self.entries.get(&key).await {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%key, "research cache hit");
                Some(entry)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%key, "research cache miss");
                None
            }
        }
    }

    /// Store a result, replacing any entry under the same key.
    pub async fn set(
        &self,
        topic: &str,
        depth: Depth,
        include_academic: bool,
        result: ResearchResult,
    ) {
        let key = cache_key(topic, depth, include_academic);
        let entry = CacheEntry {
            result,
            cached_at: Utc::now(),
            cache_key: key.clone(),
        };
        self.entries.insert(key, entry).await;
    }

    /// Remove one entry. Returns `true` if it was present.
    pub async fn invalidate(&self, topic: &str, depth: Depth, include_academic: bool) -> bool {
        let key = cache_key(topic, depth, include_academic);
        self.entries.remove(&key).await.is_some()
    }

    /// Remove every entry and return how many there were.
    pub async fn clear(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        let count = self.entries.entry_count();
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
        tracing::info!(count, "research cache cleared");
        count
    }

    /// Current counters.
    pub async fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks().await;
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64 * 10_000.0).round() / 100.0
        };
        CacheStats {
            size: self.entries.entry_count(),
            max_size: self.max_size,
            ttl_hours: self.ttl.as_secs_f64() / 3600.0,
            hits,
            misses,
            total_requests: total,
            hit_rate_percent: hit_rate,
        }
    }
}
