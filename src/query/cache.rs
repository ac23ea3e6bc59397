use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;
use serde::{Serialize, Deserialize};
use crate::core::error::Result;
use crate::query::ast::Query;
use crate::search::results::ResultPage;

/// Query cache for avoiding recomputation.
///
/// Lookups use `peek`, so entries are never promoted and the entry evicted at
/// capacity is always the oldest inserted one.
pub struct QueryCache {
    cache: Mutex<LruCache<QueryKey, ResultPage>>,
    capacity: usize,
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
}

/// Canonical serialization of a full query
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn from_query(query: &Query) -> Result<Self> {
        Ok(QueryKey(serde_json::to_string(query)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        QueryCache {
            cache: Mutex::new(LruCache::new(cap)),
            capacity: cap.get(),
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, key: &QueryKey) -> Option<ResultPage> {
        let cache = self.cache.lock();
        if let Some(page) = cache.peek(key) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            Some(page.clone())
        } else {
            self.miss_count.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Insert a page, evicting the oldest entry when full. Returns the evicted key.
    pub fn put(&self, key: QueryKey, page: ResultPage) -> Option<QueryKey> {
        let mut cache = self.cache.lock();
        match cache.push(key, page) {
            // `push` hands back the old value when the key was already present.
            Some((evicted, _)) if !cache.contains(&evicted) => Some(evicted),
            _ => None,
        }
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.cache.lock().contains(key)
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size: self.len(),
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}
