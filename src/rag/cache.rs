//! Embedding cache
//!
//! Rebuilding the index re-embeds every chunk, and most chunks do not change
//! between corpus exports. Queries repeat too. Both paths go through an
//! [`EmbeddingCache`] keyed by a SHA-256 of `text|model`, so a model change
//! never serves stale vectors.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hit/miss counters and current occupancy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub size_bytes: usize,
}

impl CacheStats {
    /// Hit rate in percent, 0 when nothing was looked up yet.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 * 100.0 / lookups as f64
        }
    }
}

/// Cache key for `text` embedded by `model`.
pub fn cache_key(text: &str, model: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(b"|");
    hasher.update(model.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub trait EmbeddingCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<f32>>;
    fn insert(&self, key: String, embedding: Vec<f32>);
    fn clear(&self);
    fn stats(&self) -> CacheStats;
}

struct Entry {
    embedding: Vec<f32>,
    last_used: u64,
    expires_at: Option<Instant>,
}

impl Entry {
    fn size(&self) -> usize {
        self.embedding.len() * std::mem::size_of::<f32>()
    }

    fn expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|t| now >= t)
    }
}

#[derive(Default)]
struct LruState {
    entries: HashMap<String, Entry>,
    clock: u64,
    size_bytes: usize,
}

impl LruState {
    fn remove(&mut self, key: &str) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        self.size_bytes -= entry.size();
        Some(entry)
    }
}

/// Byte-bounded in-memory cache that evicts the least recently used entry.
pub struct LruEmbeddingCache {
    state: Mutex<LruState>,
    max_bytes: usize,
    ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl LruEmbeddingCache {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            state: Mutex::new(LruState::default()),
            max_bytes,
            ttl: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Expire entries `ttl` after insertion.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EmbeddingCache for LruEmbeddingCache {
    fn get(&self, key: &str) -> Option<Vec<f32>> {
        let mut state = self.state.lock();
        state.clock += 1;
        let tick = state.clock;

        let expired = match state.entries.get_mut(key) {
            Some(entry) if !entry.expired(Instant::now()) => {
                entry.last_used = tick;
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.embedding.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            state.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn insert(&self, key: String, embedding: Vec<f32>) {
        let size = embedding.len() * std::mem::size_of::<f32>();
        if size > self.max_bytes {
            return;
        }

        let mut state = self.state.lock();
        state.remove(&key);

        while state.size_bytes + size > self.max_bytes {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    state.remove(&k);
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                }
                None => break,
            }
        }

        state.clock += 1;
        let entry = Entry {
            embedding,
            last_used: state.clock,
            expires_at: self.ttl.map(|ttl| Instant::now() + ttl),
        };
        state.size_bytes += entry.size();
        state.entries.insert(key, entry);
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.size_bytes = 0;
    }

    fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: state.entries.len(),
            size_bytes: state.size_bytes,
        }
    }
}

/// Cache that stores nothing; used when `cache_max_bytes` is 0.
#[derive(Debug, Default)]
pub struct NoOpCache {
    misses: AtomicU64,
}

impl EmbeddingCache for NoOpCache {
    fn get(&self, _key: &str) -> Option<Vec<f32>> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn insert(&self, _key: String, _embedding: Vec<f32>) {}

    fn clear(&self) {}

    fn stats(&self) -> CacheStats {
        CacheStats {
            misses: self.misses.load(Ordering::Relaxed),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VEC_BYTES: usize = 4 * 4;

    #[test]
    fn test_key_depends_on_model() {
        let a = cache_key("penal code", "hashing-384");
        let b = cache_key("penal code", "all-MiniLM-L6-v2");
        assert_ne!(a, b);
        assert_eq!(a, cache_key("penal code", "hashing-384"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hit_and_miss_counts() {
        let cache = LruEmbeddingCache::new(1024);
        assert!(cache.get("k").is_none());
        cache.insert("k".to_string(), vec![1.0; 4]);
        assert_eq!(cache.get("k"), Some(vec![1.0; 4]));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.size_bytes, VEC_BYTES);
        assert!((stats.hit_rate() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = LruEmbeddingCache::new(VEC_BYTES * 2);
        cache.insert("a".to_string(), vec![0.0; 4]);
        cache.insert("b".to_string(), vec![0.0; 4]);
        // Touch "a" so "b" is the oldest
        assert!(cache.get("a").is_some());
        cache.insert("c".to_string(), vec![0.0; 4]);

        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.stats().size_bytes, VEC_BYTES * 2);
    }

    #[test]
    fn test_replace_does_not_double_count() {
        let cache = LruEmbeddingCache::new(1024);
        cache.insert("k".to_string(), vec![0.0; 4]);
        cache.insert("k".to_string(), vec![1.0; 4]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().size_bytes, VEC_BYTES);
    }

    #[test]
    fn test_oversized_entry_skipped() {
        let cache = LruEmbeddingCache::new(8);
        cache.insert("big".to_string(), vec![0.0; 4]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = LruEmbeddingCache::new(1024).with_ttl(Duration::from_millis(0));
        cache.insert("k".to_string(), vec![0.0; 4]);
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = LruEmbeddingCache::new(1024);
        cache.insert("k".to_string(), vec![0.0; 4]);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().size_bytes, 0);
    }

    #[test]
    fn test_noop_cache() {
        let cache = NoOpCache::default();
        cache.insert("k".to_string(), vec![0.0; 4]);
        assert!(cache.get("k").is_none());
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().entries, 0);
    }
}
