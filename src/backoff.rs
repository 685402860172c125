//! Exponential backoff engine
//!
//! Produces a raw per-attempt delay or the abort sentinel when the sequence
//! has exhausted its attempt count or total duration. The raw delay is not
//! budget-aware; the timeout adjuster caps it against the remaining budget
//! afterwards.

use std::fmt;

use tracing::debug;

use crate::config::RetryTimingConfig;
use crate::constants::MAX_BACKOFF_EXPONENT;
use crate::jitter::apply_jitter;
use crate::state::RetryState;

/// Raw per-attempt delay produced by a backoff engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawDelay {
    /// Wait this many seconds before the next attempt.
    Value(f64),
    /// The sequence has exhausted its budget; stop retrying.
    Abort,
}

impl RawDelay {
    /// Numeric form used by the adjustment arithmetic. `Abort` maps to
    /// `-1.0` and participates in the same comparisons as a real delay.
    pub fn as_secs(self) -> f64 {
        match self {
            RawDelay::Value(secs) => secs,
            RawDelay::Abort => crate::constants::ABORT_SENTINEL,
        }
    }

    pub fn is_abort(self) -> bool {
        matches!(self, RawDelay::Abort)
    }
}

/// Measures how much of the gap since the previous attempt counts as delay
/// already served, given the current state and the attempt timestamp.
///
/// The default measurement is the full gap (`now − last_timestamp`); the
/// controller injects a callback that excludes the previous attempt's
/// permitted runtime so a slow attempt does not eat the next backoff wait.
pub type ActualDelayFn = Box<dyn Fn(&RetryState, f64) -> f64 + Send>;

/// Per-attempt delay accounting consumed by the retry controller.
///
/// Implementations advance `state.attempts` and `state.last_timestamp` when
/// they return a real delay, and leave the state untouched when they return
/// `Abort` (the controller duplicates the bookkeeping on that path).
pub trait Backoff: Send {
    /// Log a successful attempt at `timestamp` and return the raw delay
    /// before the next attempt.
    fn success(&mut self, state: &mut RetryState, timestamp: f64) -> RawDelay;

    /// Log a failed attempt at `timestamp` and return the raw delay before
    /// the next attempt.
    fn failure(&mut self, state: &mut RetryState, timestamp: f64) -> RawDelay;
}

/// Exponential backoff with jitter and optional actual-delay accounting.
pub struct ExponentialBackoff {
    max_attempts: u32,
    max_actual_duration: f64,
    jitter_factor: f64,
    initial_delay: f64,
    exponent_base: f64,
    delay_on_success: f64,
    min_delay: f64,
    max_delay: Option<f64>,
    consider_actual_delay: bool,
    failure_streak: u32,
    actual_delay: Option<ActualDelayFn>,
}

impl ExponentialBackoff {
    /// Create an engine from the forwarded configuration fields.
    pub fn new(config: &RetryTimingConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            max_actual_duration: config.max_actual_duration,
            jitter_factor: config.jitter_factor,
            initial_delay: config.initial_delay,
            exponent_base: config.exponent_base,
            delay_on_success: config.delay_on_success,
            min_delay: config.min_delay,
            max_delay: config.max_delay,
            consider_actual_delay: config.consider_actual_delay,
            failure_streak: 0,
            actual_delay: None,
        }
    }

    /// Override how the delay already served between attempts is measured.
    pub fn with_actual_delay(mut self, measure: ActualDelayFn) -> Self {
        self.actual_delay = Some(measure);
        self
    }

    fn exhausted(&self, state: &RetryState, now: f64) -> bool {
        if self.max_attempts > 0 && state.attempts >= self.max_attempts {
            return true;
        }
        self.max_actual_duration > 0.0
            && now - state.start_timestamp >= self.max_actual_duration
    }

    /// Clamp, account for time already served, jitter, and log the attempt.
    fn finish(&self, state: &mut RetryState, now: f64, mut delay: f64) -> RawDelay {
        if let Some(max_delay) = self.max_delay {
            delay = delay.min(max_delay);
        }
        delay = delay.max(self.min_delay);

        if self.consider_actual_delay {
            let served = match &self.actual_delay {
                Some(measure) => measure(state, now),
                None => now - state.last_timestamp.unwrap_or(now),
            };
            delay = (delay - served.max(0.0)).max(self.min_delay);
        }

        delay = apply_jitter(delay, self.jitter_factor);
        state.log_attempt(now);
        RawDelay::Value(delay)
    }
}

impl Backoff for ExponentialBackoff {
    fn success(&mut self, state: &mut RetryState, timestamp: f64) -> RawDelay {
        if self.exhausted(state, timestamp) {
            debug!(attempts = state.attempts, "backoff exhausted, aborting");
            return RawDelay::Abort;
        }
        self.failure_streak = 0;
        self.finish(state, timestamp, self.delay_on_success)
    }

    fn failure(&mut self, state: &mut RetryState, timestamp: f64) -> RawDelay {
        if self.exhausted(state, timestamp) {
            debug!(attempts = state.attempts, "backoff exhausted, aborting");
            return RawDelay::Abort;
        }
        let exponent = self.failure_streak.min(MAX_BACKOFF_EXPONENT);
        self.failure_streak = self.failure_streak.saturating_add(1);
        let delay = self.initial_delay * self.exponent_base.powi(exponent as i32);
        self.finish(state, timestamp, delay)
    }
}

impl fmt::Debug for ExponentialBackoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExponentialBackoff")
            .field("max_attempts", &self.max_attempts)
            .field("max_actual_duration", &self.max_actual_duration)
            .field("jitter_factor", &self.jitter_factor)
            .field("initial_delay", &self.initial_delay)
            .field("exponent_base", &self.exponent_base)
            .field("failure_streak", &self.failure_streak)
            .field("actual_delay", &self.actual_delay.is_some())
            .finish()
    }
}
