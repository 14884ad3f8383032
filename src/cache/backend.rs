//! Cache backend implementations.

use super::clock::{Clock, SystemClock};
use super::key::CacheKey;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CacheEntry {
    data: Vec<u8>,
    /// `None` when `now + ttl` is past what `Instant` can hold; such an entry never expires.
    expires_at: Option<Instant>,
    last_accessed: Instant,
}

impl CacheEntry {
    fn new(data: Vec<u8>, now: Instant, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: now.checked_add(ttl),
            last_accessed: now,
        }
    }
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| now > at)
    }
}

/// Storage behind [`CacheManager`](super::CacheManager).
///
/// All operations are total: a backend never fails, it only misses.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<Vec<u8>>;
    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration);
    async fn delete(&self, key: &CacheKey) -> bool;
    async fn exists(&self, key: &CacheKey) -> bool;
    async fn get_by_prefix(&self, prefix: &str) -> Vec<Vec<u8>>;
    async fn clear(&self);
    async fn len(&self) -> usize;
    fn name(&self) -> &'static str;
}

/// Process-local map with lazy, read-triggered expiry.
///
/// There is no background sweeper: an expired entry is removed by the first
/// `get`/`exists`/prefix scan that observes it, or when an insert needs room.
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self::with_clock(max_entries, Arc::new(SystemClock))
    }

    pub fn with_clock(max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_entries: max_entries.max(1),
            clock,
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn evict_if_needed(&self, entries: &mut HashMap<String, CacheEntry>, now: Instant) {
        if entries.len() < self.max_entries {
            return;
        }
        entries.retain(|_, e| !e.is_expired(now));
        while entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                entries.remove(&k);
            } else {
                break;
            }
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        let now = self.clock.now();
        let mut entries = self.write();
        if let Some(entry) = entries.get_mut(key.as_str()) {
            if entry.is_expired(now) {
                entries.remove(key.as_str());
                return None;
            }
            entry.last_accessed = now;
            return Some(entry.data.clone());
        }
        None
    }
    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) {
        let now = self.clock.now();
        let mut entries = self.write();
        if !entries.contains_key(key.as_str()) {
            self.evict_if_needed(&mut entries, now);
        }
        entries.insert(key.as_str().to_string(), CacheEntry::new(value.to_vec(), now, ttl));
    }
    async fn delete(&self, key: &CacheKey) -> bool {
        self.write().remove(key.as_str()).is_some()
    }
    async fn exists(&self, key: &CacheKey) -> bool {
        let now = self.clock.now();
        let mut entries = self.write();
        match entries.get(key.as_str()) {
            Some(e) if e.is_expired(now) => {
                entries.remove(key.as_str());
                false
            }
            Some(_) => true,
            None => false,
        }
    }
    async fn get_by_prefix(&self, prefix: &str) -> Vec<Vec<u8>> {
        let now = self.clock.now();
        let mut entries = self.write();
        entries.retain(|k, e| !(k.starts_with(prefix) && e.is_expired(now)));
        let mut hits: Vec<(&String, &CacheEntry)> = entries
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();
        hits.sort_by(|a, b| a.0.cmp(b.0));
        hits.into_iter().map(|(_, e)| e.data.clone()).collect()
    }
    async fn clear(&self) {
        self.write().clear();
    }
    async fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }
    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Backend that stores nothing; every read misses.
pub struct NullCache;
impl NullCache {
    pub fn new() -> Self {
        Self
    }
}
impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for NullCache {
    async fn get(&self, _: &CacheKey) -> Option<Vec<u8>> {
        None
    }
    async fn set(&self, _: &CacheKey, _: &[u8], _: Duration) {}
    async fn delete(&self, _: &CacheKey) -> bool {
        false
    }
    async fn exists(&self, _: &CacheKey) -> bool {
        false
    }
    async fn get_by_prefix(&self, _: &str) -> Vec<Vec<u8>> {
        Vec::new()
    }
    async fn clear(&self) {}
    async fn len(&self) -> usize {
        0
    }
    fn name(&self) -> &'static str {
        "null"
    }
}
