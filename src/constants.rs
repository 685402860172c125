// Constants and default configuration values for retry timing
use std::f64::consts::SQRT_2;

/// Delay value signalling that the retry sequence has exhausted its attempt
/// or duration budget and the caller must stop retrying.
pub const ABORT_SENTINEL: f64 = -1.0;

/// Timeout value signalling that per-attempt timeouts are disabled.
pub const TIMEOUT_DISABLED: f64 = -1.0;

/// Default wall-clock budget for an entire retry sequence, in seconds.
pub const DEFAULT_MAX_ACTUAL_DURATION: f64 = 50.0;

/// Default fraction of the remaining budget allotted to the next attempt's
/// timeout.
pub const DEFAULT_ADJUST_TIMEOUT_FACTOR: f64 = 0.5;

/// Default floor on any computed timeout, in seconds.
pub const DEFAULT_MIN_ADJUST_TIMEOUT: f64 = 5.0;

/// Default symmetric jitter fraction applied to computed timeouts.
pub const DEFAULT_TIMEOUT_JITTER_FACTOR: f64 = 0.1;

/// Default symmetric jitter fraction applied to backoff delays.
pub const DEFAULT_JITTER_FACTOR: f64 = 0.1;

/// Default maximum number of attempts (0 = unlimited).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 0;

/// Default delay before the first backoff step, in seconds.
pub const DEFAULT_INITIAL_DELAY: f64 = SQRT_2;

/// Default base of the backoff exponent.
pub const DEFAULT_EXPONENT_BASE: f64 = SQRT_2;

/// Default delay returned after a successful attempt, in seconds.
pub const DEFAULT_DELAY_ON_SUCCESS: f64 = 0.0;

/// Default lower bound on backoff delays, in seconds.
pub const DEFAULT_MIN_DELAY: f64 = 0.0;

/// Largest jitter fraction a symmetric jitter can carry without producing
/// negative durations.
pub const MAX_JITTER_FACTOR: f64 = 0.5;

/// Maximum exponent for the backoff calculation to keep the delay finite.
pub const MAX_BACKOFF_EXPONENT: u32 = 30;
