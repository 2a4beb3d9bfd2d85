//! # geogate
//!
//! Request admission for IP-geolocation services: per-caller request
//! quotas over a shared counter store, plus classification of reserved
//! (non-routable) IPv4 addresses that are not worth geolocating.
//!
//! The crate is the gatekeeping core of a public geolocation API. It does
//! not speak HTTP and does not perform lookups; the surrounding service
//! hands it the caller's textual IP address and acts on the decision.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use geogate::{
//!     Address, Admission, InMemoryCounterStore, QuotaGate, QuotaPolicy, ReservedRanges,
//!     SystemClock,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // At most 10 000 requests per caller per hour.
//!     let policy = QuotaPolicy::new(10_000, Duration::from_secs(3600))?;
//!     let store = InMemoryCounterStore::new(Arc::new(SystemClock::new()));
//!     let gate = QuotaGate::new(store, policy);
//!
//!     match gate.admit("203.0.113.9").await? {
//!         Admission::Allowed => { /* proceed to the lookup */ }
//!         Admission::Rejected(_) => { /* respond 403 Forbidden */ }
//!     }
//!
//!     // Reserved addresses are classified independently of quotas.
//!     let reserved = ReservedRanges::iana();
//!     let query: Address = "192.168.1.1".parse()?;
//!     assert!(reserved.is_reserved(query));
//!     Ok(())
//! }
//! ```
//!
//! ## Fixed-Window Quotas
//!
//! Each caller gets one counter in the store, keyed by the canonical
//! 32-bit form of its address (`"ip:" + decimal`). The first request of a
//! window creates the counter and arms a TTL of the window length; later
//! requests only increment. When the TTL elapses the counter disappears
//! and the next request starts a fresh window. The window is therefore
//! fixed, anchored at first use - not sliding.
//!
//! Over-quota requests are rejected *after* being counted, so repeat
//! offenders remain visible in the store for the rest of their window.
//!
//! ## Distributed Enforcement
//!
//! With the `redis-store` feature, [`RedisCounterStore`] backs the gate
//! with Redis `INCR`/`EXPIRE`, making the quota fleet-wide: every service
//! instance pointed at the same Redis enforces one shared ceiling per
//! caller. The in-memory store has the same semantics for single-instance
//! deployments and tests.
//!
//! ```rust,no_run
//! # #[cfg(feature = "redis-store")]
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! use geogate::{QuotaGate, QuotaPolicy, RedisCounterStore};
//! use std::time::Duration;
//!
//! let store = RedisCounterStore::connect("redis://127.0.0.1/").await?;
//! let policy = QuotaPolicy::new(10_000, Duration::from_secs(3600))?;
//! let gate = QuotaGate::new(store, policy);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Policy
//!
//! The gate never decides what happens when the counter store is down: a
//! store failure surfaces as [`AdmitError::Store`] and the caller chooses
//! whether to fail open or closed. Malformed caller addresses surface as
//! [`AdmitError::Address`] before any store access. Quota rejection is
//! not an error; it is the [`Admission::Rejected`] value.
//!
//! ## Feature Flags
//!
//! - `redis-store`: the Redis-backed counter store adapter.
//! - `test-helpers`: exposes [`infrastructure::mocks`] (`MockClock`,
//!   `MockCounterStore`) to downstream integration tests.

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    address::{Address, AddressFormatError},
    policy::{PolicyError, QuotaPolicy},
    reserved::{ReservedRange, ReservedRanges},
};

pub use application::{
    gate::{counter_key, Admission, AdmitError, Gated, QuotaGate, RejectReason},
    metrics::{AdmissionMetrics, MetricsSnapshot},
    ports::{Clock, CounterStore, CounterStoreError},
};

pub use infrastructure::{clock::SystemClock, memory_store::InMemoryCounterStore};

#[cfg(feature = "redis-store")]
pub use infrastructure::redis_store::RedisCounterStore;
