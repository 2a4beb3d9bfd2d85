//! The quota gate: per-caller request admission.
//!
//! [`QuotaGate`] sits in front of the request handler. For every inbound
//! request it folds the caller's address into its canonical form, bumps
//! that caller's counter in the shared store, arms the quota window on the
//! counter's first increment, and rejects once the configured ceiling is
//! exceeded.
//!
//! The original system expressed this as a decorator around the handler;
//! here the same pipeline is an explicit async call. Use [`QuotaGate::admit`]
//! and branch on the result, or [`QuotaGate::run_gated`] to wrap a handler
//! directly.
//!
//! Two deliberate ordering properties:
//! - The increment always happens before the ceiling check, so over-quota
//!   requests still land in the window's count and repeated offenders stay
//!   visible in the store.
//! - A malformed caller address fails before any store access; it is a
//!   client error, not a quota decision, and must not create counters.

use crate::application::metrics::AdmissionMetrics;
use crate::application::ports::{CounterStore, CounterStoreError};
use crate::domain::address::{Address, AddressFormatError};
use crate::domain::policy::QuotaPolicy;
use std::fmt;
use std::future::Future;

/// Prefix of every quota counter key in the shared store.
const KEY_PREFIX: &str = "ip:";

/// Derive the counter key for an address.
///
/// The key is the fixed prefix plus the decimal form of the canonical
/// 32-bit value, so every spelling of an address shares one counter and
/// the keyspace is trivially scannable (`ip:*`).
pub fn counter_key(address: Address) -> String {
    format!("{}{}", KEY_PREFIX, address.as_u32())
}

/// Why a request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The caller exhausted its quota for the current window.
    QuotaExceeded,
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request is within quota; proceed to the handler.
    Allowed,
    /// The request must not reach the handler.
    Rejected(RejectReason),
}

impl Admission {
    /// Check if this outcome is `Allowed`.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }

    /// Check if this outcome is `Rejected`.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Admission::Rejected(_))
    }
}

/// Error returned when an admission check cannot produce a decision.
///
/// Quota rejection is not an error; it is an [`Admission`] value. Errors
/// are the two cases where no decision exists: the caller address is
/// malformed, or the counter store failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmitError {
    /// The caller address is not a well-formed dotted quad. Surfaced
    /// before any store access; treat as a client error.
    Address(AddressFormatError),
    /// The counter store could not serve the check. Whether to admit or
    /// reject in this state is the surrounding system's policy.
    Store(CounterStoreError),
}

impl fmt::Display for AdmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmitError::Address(e) => write!(f, "malformed caller address: {}", e),
            AdmitError::Store(e) => write!(f, "admission check failed: {}", e),
        }
    }
}

impl std::error::Error for AdmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdmitError::Address(e) => Some(e),
            AdmitError::Store(e) => Some(e),
        }
    }
}

impl From<AddressFormatError> for AdmitError {
    fn from(e: AddressFormatError) -> Self {
        AdmitError::Address(e)
    }
}

impl From<CounterStoreError> for AdmitError {
    fn from(e: CounterStoreError) -> Self {
        AdmitError::Store(e)
    }
}

/// Result of running a handler behind the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gated<T> {
    /// The request was admitted and the handler ran to completion.
    Handled(T),
    /// The request was rejected; the handler never ran.
    Rejected(RejectReason),
}

/// Per-caller quota enforcement over a shared counter store.
///
/// The gate holds no per-caller state of its own: every counter lives in
/// the store for at most one window, and atomicity of the increment is
/// the store's responsibility. The gate is cheap to clone when the store
/// handle is (for example an `Arc`-wrapped store).
#[derive(Debug, Clone)]
pub struct QuotaGate<S> {
    store: S,
    policy: QuotaPolicy,
    metrics: AdmissionMetrics,
}

impl<S> QuotaGate<S>
where
    S: CounterStore,
{
    /// Create a gate enforcing `policy` against `store`.
    pub fn new(store: S, policy: QuotaPolicy) -> Self {
        Self {
            store,
            policy,
            metrics: AdmissionMetrics::new(),
        }
    }

    /// The policy this gate enforces.
    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    /// Admission counters for this gate.
    pub fn metrics(&self) -> &AdmissionMetrics {
        &self.metrics
    }

    /// Check whether a request from `caller_address` is within quota.
    ///
    /// Parses the address, then runs the counter pipeline. A parse
    /// failure returns [`AdmitError::Address`] without touching the store.
    ///
    /// # Errors
    /// [`AdmitError::Address`] for malformed input,
    /// [`AdmitError::Store`] when the counter store fails.
    pub async fn admit(&self, caller_address: &str) -> Result<Admission, AdmitError> {
        let address = match Address::parse(caller_address) {
            Ok(address) => address,
            Err(e) => {
                self.metrics.record_malformed();
                return Err(e.into());
            }
        };
        self.admit_address(address).await
    }

    /// Check a caller that has already been parsed to an [`Address`].
    ///
    /// Increment first, then arm the window if this increment created the
    /// counter, then compare against the ceiling. The order is load-bearing:
    /// over-quota requests are still counted, and the TTL is armed exactly
    /// once per window.
    pub async fn admit_address(&self, address: Address) -> Result<Admission, AdmitError> {
        let key = counter_key(address);

        let count = self.store.incr(&key).await?;
        if count == 1 {
            self.store.expire(&key, self.policy.window()).await?;
        }

        if count > self.policy.max_requests() {
            self.metrics.record_rejected();
            tracing::debug!(
                address = %address,
                count,
                max_requests = self.policy.max_requests(),
                "request rejected over quota"
            );
            return Ok(Admission::Rejected(RejectReason::QuotaExceeded));
        }

        self.metrics.record_allowed();
        Ok(Admission::Allowed)
    }

    /// Run `handler` only if a request from `caller_address` is admitted.
    ///
    /// This is the wrapped-handler form of the gate: the handler future is
    /// constructed and awaited only on [`Admission::Allowed`]; a rejected
    /// request returns [`Gated::Rejected`] without ever invoking it.
    pub async fn run_gated<F, Fut, T>(
        &self,
        caller_address: &str,
        handler: F,
    ) -> Result<Gated<T>, AdmitError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self.admit(caller_address).await? {
            Admission::Allowed => Ok(Gated::Handled(handler().await)),
            Admission::Rejected(reason) => Ok(Gated::Rejected(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::memory_store::InMemoryCounterStore;
    use crate::infrastructure::mocks::{MockClock, MockCounterStore};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn policy(max_requests: u64, window_secs: u64) -> QuotaPolicy {
        QuotaPolicy::new(max_requests, Duration::from_secs(window_secs)).unwrap()
    }

    #[test]
    fn test_counter_key_format() {
        // 1.2.3.4 packs to 0x01020304 = 16909060.
        let address = Address::parse("1.2.3.4").unwrap();
        assert_eq!(counter_key(address), "ip:16909060");

        let address = Address::parse("0.0.0.0").unwrap();
        assert_eq!(counter_key(address), "ip:0");

        let address = Address::parse("255.255.255.255").unwrap();
        assert_eq!(counter_key(address), "ip:4294967295");
    }

    #[test]
    fn test_key_is_canonical_per_address() {
        let a = Address::parse("192.168.1.1").unwrap();
        let b = Address::parse("192.168.1.1").unwrap();
        assert_eq!(counter_key(a), counter_key(b));
        assert_ne!(
            counter_key(a),
            counter_key(Address::parse("192.168.1.2").unwrap())
        );
    }

    #[tokio::test]
    async fn test_requests_within_quota_allowed() {
        let store = InMemoryCounterStore::new(Arc::new(SystemClock::new()));
        let gate = QuotaGate::new(store, policy(3, 60));

        for _ in 0..3 {
            assert_eq!(gate.admit("8.8.8.8").await.unwrap(), Admission::Allowed);
        }
        assert_eq!(
            gate.admit("8.8.8.8").await.unwrap(),
            Admission::Rejected(RejectReason::QuotaExceeded)
        );
    }

    #[tokio::test]
    async fn test_rejection_keeps_counting() {
        let store = MockCounterStore::new();
        let gate = QuotaGate::new(store, policy(1, 60));

        assert!(gate.admit("8.8.8.8").await.unwrap().is_allowed());
        assert!(gate.admit("8.8.8.8").await.unwrap().is_rejected());
        assert!(gate.admit("8.8.8.8").await.unwrap().is_rejected());

        // All three requests incremented, including the rejected ones.
        assert_eq!(gate.metrics().requests_allowed(), 1);
        assert_eq!(gate.metrics().requests_rejected(), 2);
        let key = counter_key(Address::parse("8.8.8.8").unwrap());
        assert_eq!(gate.store.incr_calls(), 3);
        assert_eq!(gate.store.value(&key), Some(3));
    }

    #[tokio::test]
    async fn test_expire_armed_only_on_first_increment() {
        let store = MockCounterStore::new();
        let gate = QuotaGate::new(store, policy(10, 60));

        for _ in 0..5 {
            gate.admit("8.8.8.8").await.unwrap();
        }
        assert_eq!(gate.store.incr_calls(), 5);
        assert_eq!(gate.store.expire_calls(), 1);
    }

    #[tokio::test]
    async fn test_distinct_callers_have_independent_quotas() {
        let store = InMemoryCounterStore::new(Arc::new(SystemClock::new()));
        let gate = QuotaGate::new(store, policy(1, 60));

        assert!(gate.admit("8.8.8.8").await.unwrap().is_allowed());
        assert!(gate.admit("1.1.1.1").await.unwrap().is_allowed());
        assert!(gate.admit("8.8.8.8").await.unwrap().is_rejected());
        assert!(gate.admit("1.1.1.1").await.unwrap().is_rejected());
    }

    #[tokio::test]
    async fn test_window_elapsing_resets_counter() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let store = InMemoryCounterStore::new(clock.clone());
        let gate = QuotaGate::new(store, policy(3, 60));

        for _ in 0..3 {
            assert!(gate.admit("8.8.8.8").await.unwrap().is_allowed());
        }
        assert!(gate.admit("8.8.8.8").await.unwrap().is_rejected());

        clock.advance(Duration::from_secs(61));

        // Fresh window: back to count one.
        assert!(gate.admit("8.8.8.8").await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_window_not_refreshed_by_later_requests() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let store = InMemoryCounterStore::new(clock.clone());
        let gate = QuotaGate::new(store, policy(100, 60));

        gate.admit("8.8.8.8").await.unwrap();
        clock.advance(Duration::from_secs(45));
        // Mid-window activity must not push the expiry out.
        gate.admit("8.8.8.8").await.unwrap();
        clock.advance(Duration::from_secs(30));

        // 75s after the first request the window has elapsed even though
        // the last request was only 30s ago.
        gate.admit("8.8.8.8").await.unwrap();
        let key = counter_key(Address::parse("8.8.8.8").unwrap());
        assert_eq!(gate.store.counter(&key), Some(1));
    }

    #[tokio::test]
    async fn test_malformed_address_never_touches_store() {
        let store = MockCounterStore::new();
        let gate = QuotaGate::new(store, policy(3, 60));

        for bad in ["", "not-an-ip", "1.2.3.256", "1.2.3", "::1"] {
            let err = gate.admit(bad).await.unwrap_err();
            assert!(matches!(err, AdmitError::Address(_)), "{:?}", bad);
        }

        assert_eq!(gate.store.incr_calls(), 0);
        assert_eq!(gate.store.expire_calls(), 0);
        assert_eq!(gate.metrics().malformed_addresses(), 5);
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let store = MockCounterStore::new();
        store.set_unavailable(true);
        let gate = QuotaGate::new(store, policy(3, 60));

        let err = gate.admit("8.8.8.8").await.unwrap_err();
        assert!(matches!(err, AdmitError::Store(_)));
        // No decision was recorded.
        assert_eq!(gate.metrics().snapshot().total_requests(), 0);
    }

    #[tokio::test]
    async fn test_run_gated_invokes_handler_only_when_allowed() {
        let store = InMemoryCounterStore::new(Arc::new(SystemClock::new()));
        let gate = QuotaGate::new(store, policy(1, 60));

        let outcome = gate.run_gated("8.8.8.8", || async { 42 }).await.unwrap();
        assert_eq!(outcome, Gated::Handled(42));

        let outcome = gate.run_gated("8.8.8.8", || async { 42 }).await.unwrap();
        assert_eq!(outcome, Gated::Rejected(RejectReason::QuotaExceeded));
    }

    #[tokio::test]
    async fn test_admit_address_skips_parsing() {
        let store = InMemoryCounterStore::new(Arc::new(SystemClock::new()));
        let gate = QuotaGate::new(store, policy(1, 60));

        let address = Address::parse("203.0.113.9").unwrap();
        assert!(gate.admit_address(address).await.unwrap().is_allowed());
        assert!(gate.admit_address(address).await.unwrap().is_rejected());
    }

    #[tokio::test]
    async fn test_gate_shares_store_through_arc() {
        let store = Arc::new(InMemoryCounterStore::new(Arc::new(SystemClock::new())));
        let gate_a = QuotaGate::new(store.clone(), policy(2, 60));
        let gate_b = QuotaGate::new(store, policy(2, 60));

        // Both gates hit the same counters.
        assert!(gate_a.admit("8.8.8.8").await.unwrap().is_allowed());
        assert!(gate_b.admit("8.8.8.8").await.unwrap().is_allowed());
        assert!(gate_a.admit("8.8.8.8").await.unwrap().is_rejected());
    }

    #[test]
    fn test_admit_error_display_and_source() {
        use std::error::Error;

        let err = AdmitError::from(AddressFormatError::OctetCount(3));
        assert!(err.to_string().starts_with("malformed caller address"));
        assert!(err.source().is_some());

        let err = AdmitError::from(CounterStoreError::Unavailable("down".into()));
        assert!(err.to_string().starts_with("admission check failed"));
        assert!(err.source().is_some());
    }
}
