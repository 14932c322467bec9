//! In-memory response caching with moka.
//!
//! Aggregate endpoints recompute statistics over every blog in the store.
//! Their results are cached as serialized JSON. Every blog write bumps the
//! cache generation, and entries are keyed by the generation that was
//! current when their computation started, so a result computed from data
//! read before a write is never served after it.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::ApiError;

/// Default cache capacity (number of entries).
pub const DEFAULT_CACHE_CAPACITY: u64 = 100;

/// Upper bound on how long an entry may live even without writes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cached response with metadata.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    /// Serialized JSON response.
    pub json: String,
    /// When this entry was cached.
    pub cached_at: chrono::DateTime<chrono::Utc>,
}

/// Cache of aggregate responses, invalidated by generation.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Cache<String, CachedEntry>,
    generation: Arc<AtomicU64>,
}

impl ResponseCache {
    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

/// Create a new response cache with default settings.
pub fn new_cache() -> ResponseCache {
    ResponseCache {
        entries: Cache::builder()
            .max_capacity(DEFAULT_CACHE_CAPACITY)
            .time_to_live(DEFAULT_TTL)
            .build(),
        generation: Arc::new(AtomicU64::new(0)),
    }
}

/// Get a cached value or compute and cache it.
pub async fn get_or_compute<T, F, Fut>(
    cache: &ResponseCache,
    key: &str,
    compute: F,
) -> Result<T, ApiError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let generation = cache.current_generation();
    let entry_key = format!("{generation}:{key}");

    if let Some(entry) = cache.entries.get(&entry_key).await {
        match serde_json::from_str(&entry.json) {
            Ok(value) => {
                tracing::debug!(key = %key, generation, cached_at = %entry.cached_at, "cache hit");
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to deserialize cached entry");
            }
        }
    }

    tracing::debug!(key = %key, generation, "cache miss, computing");
    let value = compute().await?;

    match serde_json::to_string(&value) {
        Ok(json) => {
            let entry = CachedEntry {
                json,
                cached_at: chrono::Utc::now(),
            };
            cache.entries.insert(entry_key, entry).await;
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "failed to serialize for cache");
        }
    }

    Ok(value)
}

/// Start a new generation after a write to the blogs and drop older entries.
pub fn invalidate(cache: &ResponseCache) {
    let generation = cache.generation.fetch_add(1, Ordering::AcqRel) + 1;
    cache.entries.invalidate_all();
    tracing::debug!(generation, "response cache invalidated");
}
