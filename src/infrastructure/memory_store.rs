//! In-process counter store.
//!
//! A DashMap-backed implementation of the `CounterStore` port for
//! single-instance deployments and tests. Counters expire lazily: an
//! entry whose deadline has passed is treated as absent by the next
//! operation that touches it, which reproduces the store-side TTL
//! semantics the gate relies on without a background reaper. Call
//! [`InMemoryCounterStore::purge_expired`] periodically if abandoned
//! entries should also be dropped from memory.
//!
//! Atomicity: DashMap's entry API holds the shard lock for the whole
//! read-modify-write, so concurrent increments for one key never lose an
//! update.

use crate::application::ports::{Clock, CounterStore, CounterStoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    count: u64,
    expires_at: Option<Instant>,
}

impl CounterEntry {
    fn expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// Per-process counter store with lazy TTL expiry.
///
/// Takes its notion of time from the `Clock` port, so tests can drive
/// window expiry deterministically with a mock clock.
#[derive(Debug, Clone)]
pub struct InMemoryCounterStore {
    counters: Arc<DashMap<String, CounterEntry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCounterStore {
    /// Create an empty store reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// The live value of a counter, or `None` if absent or expired.
    pub fn counter(&self, key: &str) -> Option<u64> {
        let now = self.clock.now();
        let entry = self.counters.get(key)?;
        if entry.expired(now) {
            None
        } else {
            Some(entry.count)
        }
    }

    /// Number of entries currently held, including expired ones that have
    /// not been purged yet.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Check if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.counters.clear();
    }

    /// Drop entries whose deadline has passed.
    ///
    /// Purely a memory-reclamation aid; expired entries already read as
    /// absent everywhere else.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.counters.retain(|_, entry| !entry.expired(now));
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn incr(&self, key: &str) -> Result<u64, CounterStoreError> {
        let now = self.clock.now();
        let mut entry = self
            .counters
            .entry(key.to_string())
            .or_insert(CounterEntry {
                count: 0,
                expires_at: None,
            });
        if entry.expired(now) {
            // The window elapsed; the counter is logically absent and this
            // increment recreates it.
            *entry = CounterEntry {
                count: 0,
                expires_at: None,
            };
        }
        entry.count += 1;
        Ok(entry.count)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CounterStoreError> {
        let now = self.clock.now();
        if let Some(mut entry) = self.counters.get_mut(key) {
            entry.expires_at = Some(now + ttl);
        }
        Ok(())
    }
}
