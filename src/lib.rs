//! Budget-aware retry timing.
//!
//! After each attempt of some external operation, this crate computes the
//! pair a retry loop needs: how long to wait before the next attempt
//! (delay) and how long that attempt itself is allowed to run (timeout).
//! An exponential backoff engine proposes a raw delay; the adaptive timeout
//! layer caps it so it cannot exhaust the remaining wall-clock budget,
//! carves the next attempt's timeout out of whatever time is left, jitters
//! it to desynchronize concurrent retriers, and keeps attempt bookkeeping
//! advancing even past exhaustion.
//!
//! Exhaustion is communicated as data, not as an error: once the sequence
//! runs out of attempts or budget, the returned delay is the abort sentinel
//! (`-1`) and callers are expected to stop retrying. The crate performs no
//! I/O and no sleeping; callers own the waiting and the timeout
//! enforcement.
//!
//! # Examples
//!
//! ```
//! use adaptive_retry::{RetryTimer, RetryTimingConfig, ABORT_SENTINEL};
//!
//! # fn main() -> Result<(), adaptive_retry::ConfigError> {
//! let config = RetryTimingConfig::builder()
//!     .max_actual_duration(60.0)
//!     .adjust_timeout_factor(0.5)
//!     .min_adjust_timeout(2.0)
//!     .build()?;
//! let mut timer = RetryTimer::new(config)?;
//!
//! // Before any attempt, preview the first timeout.
//! let first_timeout = timer.timeout();
//! assert!(first_timeout > 0.0);
//!
//! let (delay, timeout) = timer.failure();
//! if delay != ABORT_SENTINEL {
//!     // Sleep for `delay`, then run the next attempt for at most `timeout`.
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod adjust;
pub mod backoff;
pub mod clock;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod jitter;
pub mod state;

pub use adjust::TimeoutAdjuster;
pub use backoff::{ActualDelayFn, Backoff, ExponentialBackoff, RawDelay};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::{RetryTimingConfig, RetryTimingConfigBuilder};
pub use constants::{ABORT_SENTINEL, TIMEOUT_DISABLED};
pub use controller::RetryTimer;
pub use error::{ConfigError, ConfigResult};
pub use jitter::{apply_jitter, apply_jitter_with};
pub use state::RetryState;
