//! Retry controller: the public surface of the crate
//!
//! After each attempt of some external operation, the controller produces
//! the pair every retry loop needs: how long to wait before the next attempt
//! and how long that attempt may run. The caller does the actual sleeping
//! and timeout enforcement; the controller only does the arithmetic and the
//! bookkeeping.
//!
//! One controller serves one logical retry sequence and is used sequentially
//! by a single caller; it is not safe for concurrent use without external
//! synchronization.

use std::fmt;

use tracing::{debug, warn};

use crate::adjust::TimeoutAdjuster;
use crate::backoff::{Backoff, ExponentialBackoff};
use crate::clock::{Clock, SystemClock};
use crate::config::RetryTimingConfig;
use crate::constants::ABORT_SENTINEL;
use crate::error::ConfigResult;
use crate::state::RetryState;

/// Budget-aware retry timing for one retry sequence.
///
/// # Examples
///
/// ```
/// use adaptive_retry::{RetryTimer, RetryTimingConfig, ABORT_SENTINEL};
///
/// # fn main() -> Result<(), adaptive_retry::ConfigError> {
/// let config = RetryTimingConfig::builder()
///     .max_actual_duration(30.0)
///     .adjust_timeout_factor(0.5)
///     .build()?;
/// let mut timer = RetryTimer::new(config)?;
///
/// let (delay, timeout) = timer.failure();
/// if delay == ABORT_SENTINEL {
///     // Budget exhausted; stop retrying.
/// } else {
///     // Sleep for `delay`, then run the next attempt for at most `timeout`.
/// }
/// # Ok(())
/// # }
/// ```
pub struct RetryTimer<C: Clock = SystemClock> {
    state: RetryState,
    engine: Box<dyn Backoff>,
    adjuster: TimeoutAdjuster,
    clock: C,
}

impl RetryTimer<SystemClock> {
    /// Create a timer with the system clock and the default exponential
    /// backoff engine.
    pub fn new(config: RetryTimingConfig) -> ConfigResult<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> RetryTimer<C> {
    /// Create a timer with a custom clock (for testing).
    pub fn with_clock(config: RetryTimingConfig, clock: C) -> ConfigResult<Self> {
        config.validate()?;
        // The previous attempt was allowed to run for `last_timeout`; that
        // runtime is not idle waiting and must not shrink the next delay.
        let engine = ExponentialBackoff::new(&config).with_actual_delay(Box::new(|state, now| {
            let last = state.last_timestamp.unwrap_or(now);
            (now - last) - state.last_timeout.unwrap_or(0.0)
        }));
        Ok(Self::assemble(&config, Box::new(engine), clock))
    }

    /// Create a timer around a caller-supplied backoff engine.
    pub fn with_backoff(
        config: RetryTimingConfig,
        engine: Box<dyn Backoff>,
        clock: C,
    ) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::assemble(&config, engine, clock))
    }

    fn assemble(config: &RetryTimingConfig, engine: Box<dyn Backoff>, clock: C) -> Self {
        let start_timestamp = clock.now();
        Self {
            state: RetryState::new(start_timestamp),
            engine,
            adjuster: TimeoutAdjuster::new(config),
            clock,
        }
    }

    /// Log a successful attempt at the current time.
    pub fn success(&mut self) -> (f64, f64) {
        let now = self.clock.now();
        self.success_at(now)
    }

    /// Log a failed attempt at the current time.
    pub fn failure(&mut self) -> (f64, f64) {
        let now = self.clock.now();
        self.failure_at(now)
    }

    /// Log a successful attempt at an explicit timestamp.
    pub fn success_at(&mut self, timestamp: f64) -> (f64, f64) {
        self.log_attempt(timestamp, true)
    }

    /// Log a failed attempt at an explicit timestamp.
    pub fn failure_at(&mut self, timestamp: f64) -> (f64, f64) {
        self.log_attempt(timestamp, false)
    }

    fn log_attempt(&mut self, timestamp: f64, succeeded: bool) -> (f64, f64) {
        // Anchor the first gap measurement at construction time rather than
        // at this attempt's own timestamp.
        if self.state.last_timestamp.is_none() {
            self.state.last_timestamp = Some(self.state.start_timestamp);
        }

        let raw = if succeeded {
            self.engine.success(&mut self.state, timestamp)
        } else {
            self.engine.failure(&mut self.state, timestamp)
        };
        let (delay, timeout) = self.adjuster.adjust(&mut self.state, raw, timestamp);

        if delay == ABORT_SENTINEL {
            // The engine stops advancing its bookkeeping once exhausted;
            // keep counting here so post-exhaustion calls stay observable.
            self.state.attempts += 1;
            self.state.last_timestamp = Some(timestamp);
            warn!(attempts = self.state.attempts, "retry budget exhausted");
        } else {
            debug!(
                attempts = self.state.attempts,
                delay,
                timeout,
                succeeded,
                "logged retry attempt"
            );
        }

        (delay, timeout)
    }

    /// The most recently computed delay, or `0` before any attempt.
    pub fn delay(&self) -> f64 {
        self.state.last_delay.unwrap_or(0.0)
    }

    /// The current per-attempt timeout.
    ///
    /// Idempotent between attempts; before any attempt it previews the first
    /// timeout, and with timeouts disabled it reports `-1`.
    pub fn timeout(&self) -> f64 {
        self.adjuster.current_timeout(&self.state)
    }

    /// Attempts logged so far, including attempts logged after exhaustion.
    pub fn attempts(&self) -> u32 {
        self.state.attempts
    }
}

impl<C: Clock> fmt::Debug for RetryTimer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryTimer")
            .field("state", &self.state)
            .field("adjuster", &self.adjuster)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::SQRT_2;

    use super::*;
    use crate::backoff::RawDelay;
    use crate::clock::MockClock;

    fn scenario_config() -> RetryTimingConfig {
        // max_actual_duration 50, adjust_timeout_factor 0.5,
        // min_adjust_timeout 5, exponential base sqrt(2), initial sqrt(2).
        RetryTimingConfig::builder().no_jitter().build().unwrap()
    }

    fn timer() -> RetryTimer<MockClock> {
        RetryTimer::with_clock(scenario_config(), MockClock::new()).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut config = scenario_config();
        config.adjust_timeout_factor = 2.0;
        assert!(RetryTimer::with_clock(config, MockClock::new()).is_err());
    }

    #[test]
    fn test_initial_timeout_preview() {
        let timer = timer();
        assert_eq!(timer.timeout(), 25.0);
        // The preview is not an attempt.
        assert_eq!(timer.attempts(), 0);
        assert_eq!(timer.delay(), 0.0);
    }

    #[test]
    fn test_first_failure_after_one_second() {
        let mut timer = timer();

        let (delay, timeout) = timer.failure_at(1.0);
        assert!(approx(delay, SQRT_2));
        // left = 49, timeout recomputed from what the delay leaves over.
        assert!(approx(timeout, (49.0 - SQRT_2) * 0.5));

        // Accessors agree with the returned pair.
        assert_eq!(timer.delay(), delay);
        assert_eq!(timer.timeout(), timeout);
        assert_eq!(timer.attempts(), 1);
    }

    #[test]
    fn test_timeout_floors_near_budget_boundary() {
        let mut timer = timer();

        let (_, timeout) = timer.failure_at(49.0);
        assert_eq!(timeout, 5.0);
    }

    #[test]
    fn test_exhaustion_returns_sentinel_and_keeps_counting() {
        let mut timer = timer();

        timer.failure_at(1.0);
        let (delay, timeout) = timer.failure_at(50.0);
        assert_eq!(delay, ABORT_SENTINEL);
        // The floor still applies on the abort path.
        assert_eq!(timeout, 5.0);
        assert_eq!(timer.attempts(), 2);

        // Sentinel is sticky and bookkeeping keeps advancing.
        let (delay, _) = timer.failure_at(51.0);
        assert_eq!(delay, ABORT_SENTINEL);
        let (delay, _) = timer.success_at(52.0);
        assert_eq!(delay, ABORT_SENTINEL);
        assert_eq!(timer.attempts(), 4);
    }

    #[test]
    fn test_attempts_equal_calls_regardless_of_exhaustion() {
        let config = RetryTimingConfig::builder()
            .no_jitter()
            .max_attempts(2)
            .timeouts_disabled()
            .build()
            .unwrap();
        let mut timer = RetryTimer::with_clock(config, MockClock::new()).unwrap();

        for i in 0..5 {
            timer.failure_at(i as f64);
        }
        assert_eq!(timer.attempts(), 5);
    }

    #[test]
    fn test_disabled_timeouts_mode() {
        let config = RetryTimingConfig::builder()
            .no_jitter()
            .timeouts_disabled()
            .initial_delay(1000.0)
            .build()
            .unwrap();
        let mut timer = RetryTimer::with_clock(config, MockClock::new()).unwrap();

        assert_eq!(timer.timeout(), -1.0);

        // No budget, so the delay is never capped.
        let (delay, timeout) = timer.failure_at(1.0);
        assert_eq!(delay, 1000.0);
        assert_eq!(timeout, -1.0);
        assert_eq!(timer.timeout(), -1.0);
    }

    #[test]
    fn test_budget_conservation_without_floor() {
        let config = RetryTimingConfig::builder()
            .no_jitter()
            .min_adjust_timeout(0.0)
            .build()
            .unwrap();
        let mut timer = RetryTimer::with_clock(config, MockClock::new()).unwrap();

        let mut now = 0.0;
        loop {
            now += 1.0;
            let (delay, timeout) = timer.failure_at(now);
            if delay == ABORT_SENTINEL {
                break;
            }
            let left = 50.0 - now;
            assert!(
                delay + timeout <= left + 1e-9,
                "budget overcommitted at t={now}: delay={delay} timeout={timeout} left={left}"
            );
            now += delay + timeout;
        }
    }

    #[test]
    fn test_clock_drives_implicit_timestamps() {
        let clock = MockClock::new();
        let mut timer = RetryTimer::with_clock(scenario_config(), clock.clone()).unwrap();

        clock.advance(1.0);
        let (delay, timeout) = timer.failure();
        assert!(approx(delay, SQRT_2));
        assert!(approx(timeout, (49.0 - SQRT_2) * 0.5));
    }

    #[test]
    fn test_success_uses_delay_on_success() {
        let config = RetryTimingConfig::builder()
            .no_jitter()
            .delay_on_success(2.0)
            .build()
            .unwrap();
        let mut timer = RetryTimer::with_clock(config, MockClock::new()).unwrap();

        let (delay, _) = timer.success_at(1.0);
        assert_eq!(delay, 2.0);
        assert_eq!(timer.attempts(), 1);
    }

    #[test]
    fn test_custom_backoff_injection() {
        struct FixedBackoff(f64);

        impl Backoff for FixedBackoff {
            fn success(&mut self, state: &mut RetryState, timestamp: f64) -> RawDelay {
                state.log_attempt(timestamp);
                RawDelay::Value(self.0)
            }

            fn failure(&mut self, state: &mut RetryState, timestamp: f64) -> RawDelay {
                state.log_attempt(timestamp);
                RawDelay::Value(self.0)
            }
        }

        let mut timer = RetryTimer::with_backoff(
            scenario_config(),
            Box::new(FixedBackoff(3.0)),
            MockClock::new(),
        )
        .unwrap();

        let (delay, timeout) = timer.failure_at(1.0);
        assert_eq!(delay, 3.0);
        assert!(approx(timeout, (49.0 - 3.0) * 0.5));
        assert_eq!(timer.attempts(), 1);
    }

    #[test]
    fn test_always_exhausted_backoff_still_counts_attempts() {
        struct ExhaustedBackoff;

        impl Backoff for ExhaustedBackoff {
            fn success(&mut self, _state: &mut RetryState, _timestamp: f64) -> RawDelay {
                RawDelay::Abort
            }

            fn failure(&mut self, _state: &mut RetryState, _timestamp: f64) -> RawDelay {
                RawDelay::Abort
            }
        }

        let mut timer = RetryTimer::with_backoff(
            scenario_config(),
            Box::new(ExhaustedBackoff),
            MockClock::new(),
        )
        .unwrap();

        timer.failure_at(1.0);
        timer.failure_at(2.0);
        assert_eq!(timer.attempts(), 2);
        assert_eq!(timer.delay(), ABORT_SENTINEL);
    }
}
