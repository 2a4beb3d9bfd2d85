//! Quota policy configuration.
//!
//! A [`QuotaPolicy`] pairs the quota window with the maximum request count
//! allowed inside it. Both values come from the surrounding system's
//! configuration and are validated here; the policy itself is immutable
//! for the life of the process.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Error returned when quota policy validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The maximum request count must be at least one.
    ZeroMaxRequests,
    /// The window must be a positive whole number of seconds, because the
    /// counter store's expiry granularity is seconds.
    SubsecondWindow,
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::ZeroMaxRequests => {
                write!(f, "max_requests must be greater than 0")
            }
            PolicyError::SubsecondWindow => {
                write!(f, "window must be at least 1 second")
            }
        }
    }
}

impl std::error::Error for PolicyError {}

/// The per-caller quota: at most `max_requests` requests per `window`.
///
/// The window is fixed, not sliding: it is armed once when a caller's
/// counter is created and never refreshed by later requests. When it
/// elapses the counter disappears and the next request starts a new
/// window at count one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPolicy {
    max_requests: u64,
    window_secs: u64,
}

impl QuotaPolicy {
    /// Create a policy allowing `max_requests` requests per `window`.
    ///
    /// # Errors
    /// Returns [`PolicyError::ZeroMaxRequests`] if `max_requests` is zero
    /// and [`PolicyError::SubsecondWindow`] if `window` is shorter than a
    /// second. Subsecond windows are rejected rather than rounded so the
    /// configured value is exactly what the store enforces.
    pub fn new(max_requests: u64, window: Duration) -> Result<Self, PolicyError> {
        if max_requests == 0 {
            return Err(PolicyError::ZeroMaxRequests);
        }
        if window.as_secs() == 0 {
            return Err(PolicyError::SubsecondWindow);
        }
        Ok(Self {
            max_requests,
            window_secs: window.as_secs(),
        })
    }

    /// The maximum number of requests allowed inside one window.
    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    /// The quota window.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_policy() {
        let policy = QuotaPolicy::new(10_000, Duration::from_secs(3600)).unwrap();
        assert_eq!(policy.max_requests(), 10_000);
        assert_eq!(policy.window(), Duration::from_secs(3600));
    }

    #[test]
    fn test_zero_max_requests_rejected() {
        assert_eq!(
            QuotaPolicy::new(0, Duration::from_secs(60)),
            Err(PolicyError::ZeroMaxRequests)
        );
    }

    #[test]
    fn test_subsecond_window_rejected() {
        assert_eq!(
            QuotaPolicy::new(1, Duration::ZERO),
            Err(PolicyError::SubsecondWindow)
        );
        assert_eq!(
            QuotaPolicy::new(1, Duration::from_millis(999)),
            Err(PolicyError::SubsecondWindow)
        );
    }

    #[test]
    fn test_fractional_seconds_truncate_to_whole_window() {
        // 60.9s configures a 60s window; the fractional part cannot be
        // expressed by the store and is dropped at construction.
        let policy = QuotaPolicy::new(3, Duration::from_millis(60_900)).unwrap();
        assert_eq!(policy.window(), Duration::from_secs(60));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            PolicyError::ZeroMaxRequests.to_string(),
            "max_requests must be greater than 0"
        );
        assert_eq!(
            PolicyError::SubsecondWindow.to_string(),
            "window must be at least 1 second"
        );
    }
}
