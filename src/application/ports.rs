//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the
//! application layer needs. Infrastructure adapters implement these ports.
//!
//! The central port is [`CounterStore`]: a shared atomic counter service
//! with per-key expiry. In multi-instance deployments this is Redis; a
//! single instance (or a test) can use the in-process adapter instead.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Error returned when the counter store cannot serve a request.
///
/// The gate propagates this as-is: whether an unreachable store admits or
/// rejects traffic is the surrounding system's policy, not this crate's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterStoreError {
    /// The store could not be reached or returned a protocol-level error.
    Unavailable(String),
}

impl fmt::Display for CounterStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterStoreError::Unavailable(detail) => {
                write!(f, "counter store unavailable: {}", detail)
            }
        }
    }
}

impl std::error::Error for CounterStoreError {}

/// Port for the shared counter store.
///
/// Implementations must provide per-key atomic increments: concurrent
/// `incr` calls for the same key never lose an update. That atomicity is
/// the correctness boundary of the whole quota pipeline; no in-process
/// locking supplements it.
///
/// Operations suspend on I/O rather than blocking, so one caller's store
/// round trip never stalls another caller's admission check.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment the counter at `key`, creating it at zero
    /// first if absent.
    ///
    /// # Returns
    /// The post-increment value.
    async fn incr(&self, key: &str) -> Result<u64, CounterStoreError>;

    /// Set the time-to-live of the counter at `key`. The counter vanishes
    /// once the TTL elapses. Expiry resolution is whole seconds.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CounterStoreError>;
}

// Forward the port through Arc so one store can be shared between the
// gate and any other component holding a handle.
#[async_trait]
impl<S: CounterStore + ?Sized> CounterStore for Arc<S> {
    async fn incr(&self, key: &str) -> Result<u64, CounterStoreError> {
        (**self).incr(key).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CounterStoreError> {
        (**self).expire(key, ttl).await
    }
}

/// Port for obtaining current time.
///
/// This abstraction lets the in-process store and the tests control time
/// without depending on the system clock. Infrastructure provides
/// `SystemClock` and, for tests, `MockClock`.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}
