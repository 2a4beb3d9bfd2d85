//! Observability counters for the admission gate.
//!
//! Tracks how many requests were admitted, rejected over quota, or thrown
//! out as malformed, so operators can watch the gate without wiring up an
//! external metrics backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters describing admission outcomes.
///
/// All counters use relaxed atomic operations; clones share the same
/// underlying values and can be handed to a reporting task.
#[derive(Debug, Clone)]
pub struct AdmissionMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Requests admitted within quota
    requests_allowed: AtomicU64,
    /// Requests rejected over quota
    requests_rejected: AtomicU64,
    /// Requests dropped before any store access because the caller
    /// address failed to parse
    malformed_addresses: AtomicU64,
}

impl AdmissionMetrics {
    /// Create a new metrics tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                requests_allowed: AtomicU64::new(0),
                requests_rejected: AtomicU64::new(0),
                malformed_addresses: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_allowed(&self) {
        self.inner.requests_allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.inner.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_malformed(&self) {
        self.inner
            .malformed_addresses
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Total requests admitted within quota.
    pub fn requests_allowed(&self) -> u64 {
        self.inner.requests_allowed.load(Ordering::Relaxed)
    }

    /// Total requests rejected over quota.
    pub fn requests_rejected(&self) -> u64 {
        self.inner.requests_rejected.load(Ordering::Relaxed)
    }

    /// Total requests with an unparseable caller address.
    pub fn malformed_addresses(&self) -> u64 {
        self.inner.malformed_addresses.load(Ordering::Relaxed)
    }

    /// Get a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_allowed: self.requests_allowed(),
            requests_rejected: self.requests_rejected(),
            malformed_addresses: self.malformed_addresses(),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.inner.requests_allowed.store(0, Ordering::Relaxed);
        self.inner.requests_rejected.store(0, Ordering::Relaxed);
        self.inner.malformed_addresses.store(0, Ordering::Relaxed);
    }
}

impl Default for AdmissionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of admission counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Requests admitted within quota
    pub requests_allowed: u64,
    /// Requests rejected over quota
    pub requests_rejected: u64,
    /// Requests with an unparseable caller address
    pub malformed_addresses: u64,
}

impl MetricsSnapshot {
    /// Requests that reached the quota decision (allowed + rejected).
    pub fn total_requests(&self) -> u64 {
        self.requests_allowed.saturating_add(self.requests_rejected)
    }

    /// Ratio of rejected to quota-decided requests, 0.0 when idle.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            self.requests_rejected as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let metrics = AdmissionMetrics::new();
        assert_eq!(metrics.requests_allowed(), 0);
        assert_eq!(metrics.requests_rejected(), 0);
        assert_eq!(metrics.malformed_addresses(), 0);
    }

    #[test]
    fn test_recording() {
        let metrics = AdmissionMetrics::new();
        metrics.record_allowed();
        metrics.record_allowed();
        metrics.record_rejected();
        metrics.record_malformed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_allowed, 2);
        assert_eq!(snapshot.requests_rejected, 1);
        assert_eq!(snapshot.malformed_addresses, 1);
        assert_eq!(snapshot.total_requests(), 3);
    }

    #[test]
    fn test_rejection_rate() {
        let metrics = AdmissionMetrics::new();
        assert_eq!(metrics.snapshot().rejection_rate(), 0.0);

        metrics.record_allowed();
        metrics.record_rejected();
        assert!((metrics.snapshot().rejection_rate() - 0.5).abs() < f64::EPSILON);

        metrics.record_rejected();
        metrics.record_rejected();
        assert!((metrics.snapshot().rejection_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_excluded_from_rate() {
        let metrics = AdmissionMetrics::new();
        metrics.record_malformed();
        metrics.record_malformed();
        assert_eq!(metrics.snapshot().total_requests(), 0);
        assert_eq!(metrics.snapshot().rejection_rate(), 0.0);
    }

    #[test]
    fn test_reset() {
        let metrics = AdmissionMetrics::new();
        metrics.record_allowed();
        metrics.record_rejected();
        metrics.record_malformed();

        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot {
            requests_allowed: 0,
            requests_rejected: 0,
            malformed_addresses: 0,
        });
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics1 = AdmissionMetrics::new();
        let metrics2 = metrics1.clone();

        metrics1.record_allowed();
        metrics2.record_allowed();

        assert_eq!(metrics1.requests_allowed(), 2);
        assert_eq!(metrics2.requests_allowed(), 2);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::thread;

        let metrics = AdmissionMetrics::new();
        let mut handles = vec![];

        for _ in 0..10 {
            let m = metrics.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    m.record_allowed();
                    m.record_rejected();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.requests_allowed(), 1000);
        assert_eq!(metrics.requests_rejected(), 1000);
    }
}
