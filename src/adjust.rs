//! Timeout adjustment against the remaining time budget
//!
//! Converts a raw backoff delay into the actual `(delay, timeout)` pair for
//! the next attempt: the delay is capped so it cannot exhaust what is left
//! of the sequence budget, and the timeout is carved out of the remainder,
//! jittered, and floored.

use tracing::debug;

use crate::backoff::RawDelay;
use crate::config::RetryTimingConfig;
use crate::constants::TIMEOUT_DISABLED;
use crate::jitter::apply_jitter;
use crate::state::RetryState;

/// Computes budget-aware `(delay, timeout)` pairs and persists them into the
/// sequence state.
#[derive(Debug, Clone)]
pub struct TimeoutAdjuster {
    max_actual_duration: f64,
    adjust_timeout_factor: f64,
    min_adjust_timeout: f64,
    timeout_jitter_factor: f64,
}

impl TimeoutAdjuster {
    pub fn new(config: &RetryTimingConfig) -> Self {
        Self {
            max_actual_duration: config.max_actual_duration,
            adjust_timeout_factor: config.adjust_timeout_factor,
            min_adjust_timeout: config.min_adjust_timeout,
            timeout_jitter_factor: config.timeout_jitter_factor,
        }
    }

    /// Adjust a raw delay against the remaining budget at `timestamp`.
    ///
    /// Persists the resulting pair as `state.last_delay` /
    /// `state.last_timeout` and returns it. The abort sentinel flows through
    /// the same numeric comparisons as a real delay: it escapes the cap only
    /// because `-1` is smaller than any positive cap, and subtracting it
    /// adds one second back into the computed timeout.
    ///
    /// TODO: the one-second timeout inflation on the abort path looks like a
    /// latent defect rather than a feature; audit callers before changing
    /// it, since current expectations bake it in.
    pub fn adjust(&self, state: &mut RetryState, raw: RawDelay, timestamp: f64) -> (f64, f64) {
        let mut delay = raw.as_secs();

        // Timeouts disabled: the delay passes through uncapped and the
        // timeout stays at the disabled sentinel for the whole sequence.
        if self.max_actual_duration == 0.0 {
            state.last_delay = Some(delay);
            return (delay, TIMEOUT_DISABLED);
        }

        let used = timestamp - state.start_timestamp;
        // May go negative once the budget is overrun.
        let left = self.max_actual_duration - used;

        let delay_cap = left * (1.0 - self.adjust_timeout_factor);
        if delay > delay_cap {
            debug!(delay, delay_cap, "capping delay to remaining budget");
            delay = delay_cap;
        }

        let mut timeout = (left - delay) * self.adjust_timeout_factor;
        timeout = apply_jitter(timeout, self.timeout_jitter_factor);
        if self.min_adjust_timeout > timeout {
            timeout = self.min_adjust_timeout;
        }

        state.last_delay = Some(delay);
        state.last_timeout = Some(timeout);
        (delay, timeout)
    }

    /// Current timeout for the sequence.
    ///
    /// Returns the persisted value verbatim once an attempt has been logged.
    /// Before any attempt it previews what the first timeout would be,
    /// without persisting the preview, so repeated queries stay independent
    /// draws until an attempt pins the value down.
    pub fn current_timeout(&self, state: &RetryState) -> f64 {
        if let Some(timeout) = state.last_timeout {
            return timeout;
        }
        if self.max_actual_duration == 0.0 {
            return TIMEOUT_DISABLED;
        }
        let timeout = apply_jitter(
            self.max_actual_duration * self.adjust_timeout_factor,
            self.timeout_jitter_factor,
        );
        timeout.max(self.min_adjust_timeout)
    }
}
