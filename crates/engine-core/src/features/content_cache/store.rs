//! A single bounded, content-addressed cache. Shared across threads with
//! interior mutability; stats are process-local and not persisted.

use crate::shared::models::CacheEntry;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictReason {
    Ttl,
    Lru,
    Version,
    Manual,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub total_size: u64,
    pub ttl_expirations: u64,
    pub stale_entries: u64,
}

struct Inner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    total_size: u64,
}

/// `get`/`set`/`has` key on `(content_hash, analysis_version)`; entries whose
/// stored `analysis_version` no longer matches the cache's current one are
/// treated as misses and evicted in place (invariant §3.3).
pub struct ContentCache<T: Clone> {
    analysis_version: String,
    max_entries: usize,
    max_size_bytes: u64,
    ttl_ms: Option<i64>,
    inner: Mutex<Inner<T>>,
    hits: AtomicU64,
    misses: AtomicU64,
    ttl_expirations: AtomicU64,
    stale_entries: AtomicU64,
    on_evict: Option<Arc<dyn Fn(&str, EvictReason) + Send + Sync>>,
}

impl<T: Clone> ContentCache<T> {
    pub fn new(analysis_version: impl Into<String>, max_entries: usize, max_size_bytes: u64, ttl_ms: Option<i64>) -> Self {
        Self {
            analysis_version: analysis_version.into(),
            max_entries,
            max_size_bytes,
            ttl_ms,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                total_size: 0,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            ttl_expirations: AtomicU64::new(0),
            stale_entries: AtomicU64::new(0),
            on_evict: None,
        }
    }

    pub fn with_evict_listener(mut self, listener: impl Fn(&str, EvictReason) + Send + Sync + 'static) -> Self {
        self.on_evict = Some(Arc::new(listener));
        self
    }

    fn notify_evict(&self, key: &str, reason: EvictReason) {
        if let Some(cb) = &self.on_evict {
            cb(key, reason);
        }
    }

    fn is_live(&self, entry: &CacheEntry<T>, now: DateTime<Utc>) -> Result<(), EvictReason> {
        if entry.analysis_version != self.analysis_version {
            return Err(EvictReason::Version);
        }
        if let Some(ttl) = self.ttl_ms {
            if (now - entry.created_at).num_milliseconds() > ttl {
                return Err(EvictReason::Ttl);
            }
        }
        Ok(())
    }

    pub fn get(&self, hash: &str, now: DateTime<Utc>) -> Option<T> {
        let mut inner = self.inner.lock();
        let stale = match inner.entries.get(hash) {
            Some(entry) => self.is_live(entry, now).err(),
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        if let Some(reason) = stale {
            if let Some(entry) = inner.entries.remove(hash) {
                inner.total_size = inner.total_size.saturating_sub(entry.size_bytes);
            }
            if reason == EvictReason::Ttl {
                self.ttl_expirations.fetch_add(1, Ordering::Relaxed);
            } else {
                self.stale_entries.fetch_add(1, Ordering::Relaxed);
            }
            drop(inner);
            self.notify_evict(hash, reason);
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let entry = inner.entries.get_mut(hash).expect("checked present above");
        entry.access_count += 1;
        entry.last_accessed = now;
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.result.clone())
    }

    pub fn has(&self, hash: &str, now: DateTime<Utc>) -> bool {
        let inner = self.inner.lock();
        matches!(inner.entries.get(hash), Some(entry) if self.is_live(entry, now).is_ok())
    }

    /// Inserts or overwrites; resets size, created-at, and access counter
    /// (invariant: new version wins on conflict).
    pub fn set(&self, hash: impl Into<String>, value: T, size_bytes: u64, now: DateTime<Utc>) {
        let hash = hash.into();
        let entry = CacheEntry {
            content_hash: hash.clone(),
            analysis_version: self.analysis_version.clone(),
            result: value,
            created_at: now,
            access_count: 0,
            last_accessed: now,
            size_bytes,
        };

        let mut inner = self.inner.lock();
        if let Some(old) = inner.entries.insert(hash, entry) {
            inner.total_size = inner.total_size.saturating_sub(old.size_bytes);
        }
        inner.total_size += size_bytes;
        self.evict_if_over_capacity(&mut inner);
    }

    fn evict_if_over_capacity(&self, inner: &mut Inner<T>) {
        let over_count = inner.entries.len() > self.max_entries;
        let over_size = inner.total_size > self.max_size_bytes;
        if !over_count && !over_size {
            return;
        }

        let evict_n = (inner.entries.len() as f64
            * crate::shared::constants::content_cache::EVICTION_FRACTION_HIGH)
            .ceil() as usize;
        let mut by_access: Vec<(String, DateTime<Utc>)> = inner
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.last_accessed))
            .collect();
        by_access.sort_by_key(|(_, last)| *last);

        for (key, _) in by_access.into_iter().take(evict_n.max(1)) {
            if let Some(entry) = inner.entries.remove(&key) {
                inner.total_size = inner.total_size.saturating_sub(entry.size_bytes);
            }
            self.notify_evict(&key, EvictReason::Lru);
            if inner.entries.len() <= self.max_entries && inner.total_size <= self.max_size_bytes {
                break;
            }
        }
    }

    pub fn invalidate_by_version(&self, version: &str) -> usize {
        let mut inner = self.inner.lock();
        let to_remove: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, e)| e.analysis_version == version)
            .map(|(k, _)| k.clone())
            .collect();
        for key in &to_remove {
            if let Some(entry) = inner.entries.remove(key) {
                inner.total_size = inner.total_size.saturating_sub(entry.size_bytes);
            }
            self.notify_evict(key, EvictReason::Version);
        }
        to_remove.len()
    }

    pub fn invalidate_stale(&self, now: DateTime<Utc>) -> usize {
        let Some(ttl) = self.ttl_ms else { return 0 };
        let mut inner = self.inner.lock();
        let to_remove: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, e)| (now - e.created_at).num_milliseconds() > ttl)
            .map(|(k, _)| k.clone())
            .collect();
        for key in &to_remove {
            if let Some(entry) = inner.entries.remove(key) {
                inner.total_size = inner.total_size.saturating_sub(entry.size_bytes);
            }
            self.ttl_expirations.fetch_add(1, Ordering::Relaxed);
            self.notify_evict(key, EvictReason::Ttl);
        }
        to_remove.len()
    }

    pub fn clear(&self) -> usize {
        let mut inner = self.inner.lock();
        let n = inner.entries.len();
        for key in inner.entries.keys().cloned().collect::<Vec<_>>() {
            self.notify_evict(&key, EvictReason::Manual);
        }
        inner.entries.clear();
        inner.total_size = 0;
        n
    }

    pub fn get_stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            entries: inner.entries.len(),
            hits,
            misses,
            hit_rate: if total > 0 { hits as f64 / total as f64 } else { 0.0 },
            total_size: inner.total_size,
            ttl_expirations: self.ttl_expirations.load(Ordering::Relaxed),
            stale_entries: self.stale_entries.load(Ordering::Relaxed),
        }
    }
}
