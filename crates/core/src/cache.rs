// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded TTL cache.
//!
//! An explicit cache object passed by reference to callers — never a
//! module-level singleton — so the code that uses it stays testable in
//! isolation. The caller supplies `now_ms`, which keeps expiry under the
//! control of whatever [`crate::Clock`] the caller holds.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;

struct Entry<V> {
    value: V,
    expires_at_ms: u64,
}

/// Bounded map cache with per-entry TTL.
///
/// When full, inserting evicts expired entries first and falls back to
/// evicting the entry closest to expiry.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    ttl_ms: u64,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl_ms: u64, capacity: usize) -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl_ms, capacity }
    }

    /// Get a live entry, or `None` if absent or expired.
    pub fn get(&self, key: &K, now_ms: u64) -> Option<V> {
        let entries = self.entries.lock();
        entries.get(key).filter(|e| e.expires_at_ms > now_ms).map(|e| e.value.clone())
    }

    /// Insert a value, stamping its expiry at `now_ms + ttl`.
    pub fn insert(&self, key: K, value: V, now_ms: u64) {
        let mut entries = self.entries.lock();

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            entries.retain(|_, e| e.expires_at_ms > now_ms);
            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.expires_at_ms)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(key, Entry { value, expires_at_ms: now_ms + self.ttl_ms });
    }

    /// Drop an entry (e.g. after the cached resource was destroyed).
    pub fn invalidate(&self, key: &K) {
        self.entries.lock().remove(key);
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
