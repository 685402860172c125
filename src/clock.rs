//! Time source abstraction for deterministic testing
//!
//! Retry timing is driven by float timestamps (seconds since the UNIX
//! epoch) so that budgets can go negative as a sequence overruns and the
//! abort sentinel can flow through the same arithmetic. The `Clock` trait
//! lets production code use real wall-clock time while tests control time
//! progression without actual delays.

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for time operations to enable deterministic testing
pub trait Clock: Send + Sync + 'static {
    /// Current time as seconds since the UNIX epoch.
    fn now(&self) -> f64;
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64()
    }
}

/// Implement Clock for Arc<T> where T: Clock for convenient cloning
impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Mock clock for deterministic testing
///
/// Starts at zero and only moves when a test advances it, so timestamps in
/// assertions are plain numbers.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<f64>>,
}

impl MockClock {
    /// Create a new mock clock starting at time zero.
    pub fn new() -> Self {
        Self::at(0.0)
    }

    /// Create a new mock clock starting at a specific timestamp.
    pub fn at(start: f64) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    /// Advance the mock clock by a number of seconds.
    pub fn advance(&self, secs: f64) {
        if let Ok(mut now) = self.now.lock() {
            *now += secs;
        }
    }

    /// Set the mock clock to a specific timestamp.
    pub fn set(&self, timestamp: f64) {
        if let Ok(mut now) = self.now.lock() {
            *now = timestamp;
        }
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> f64 {
        self.now.lock().map(|n| *n).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_epoch_seconds() {
        let clock = SystemClock;
        // Sometime after 2020.
        assert!(clock.now() > 1_577_836_800.0);
    }

    #[test]
    fn test_mock_clock_starts_at_zero() {
        let clock = MockClock::new();
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn test_mock_clock_advance_and_set() {
        let clock = MockClock::at(10.0);
        clock.advance(2.5);
        assert_eq!(clock.now(), 12.5);

        clock.set(100.0);
        assert_eq!(clock.now(), 100.0);
    }

    #[test]
    fn test_mock_clock_clones_share_time() {
        let clock = MockClock::new();
        let other = clock.clone();
        clock.advance(5.0);
        assert_eq!(other.now(), 5.0);
    }
}
