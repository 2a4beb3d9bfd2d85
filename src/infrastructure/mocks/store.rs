//! Mock counter store for testing.

use crate::application::ports::{CounterStore, CounterStoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct MockStoreInner {
    counters: DashMap<String, u64>,
    ttls: DashMap<String, Duration>,
    incr_calls: AtomicU64,
    expire_calls: AtomicU64,
    unavailable: AtomicBool,
}

/// Instrumented test double for the `CounterStore` port.
///
/// Records every call, exposes the raw counter values and armed TTLs, and
/// can be switched into an "unavailable" state to exercise
/// infrastructure-failure paths. TTLs are recorded but never enforced;
/// tests that need real expiry behavior pair `InMemoryCounterStore` with
/// `MockClock` instead.
#[derive(Debug, Clone, Default)]
pub struct MockCounterStore {
    inner: Arc<MockStoreInner>,
}

impl MockCounterStore {
    /// Create an empty, available mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `incr` calls received, including failed ones.
    pub fn incr_calls(&self) -> u64 {
        self.inner.incr_calls.load(Ordering::Relaxed)
    }

    /// Number of `expire` calls received, including failed ones.
    pub fn expire_calls(&self) -> u64 {
        self.inner.expire_calls.load(Ordering::Relaxed)
    }

    /// The raw value of a counter, if any.
    pub fn value(&self, key: &str) -> Option<u64> {
        self.inner.counters.get(key).map(|entry| *entry)
    }

    /// The TTL most recently armed on a key, if any.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.inner.ttls.get(key).map(|entry| *entry)
    }

    /// Make every subsequent operation fail with
    /// [`CounterStoreError::Unavailable`] (or succeed again with `false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), CounterStoreError> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            Err(CounterStoreError::Unavailable(
                "mock store marked unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CounterStore for MockCounterStore {
    async fn incr(&self, key: &str) -> Result<u64, CounterStoreError> {
        self.inner.incr_calls.fetch_add(1, Ordering::Relaxed);
        self.check_available()?;
        let mut entry = self.inner.counters.entry(key.to_string()).or_insert(0);
        *entry += 1;
        Ok(*entry)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CounterStoreError> {
        self.inner.expire_calls.fetch_add(1, Ordering::Relaxed);
        self.check_available()?;
        self.inner.ttls.insert(key.to_string(), ttl);
        Ok(())
    }
}
