// Mutable bookkeeping for one retry sequence
//
// One RetryState belongs to exactly one controller and is used sequentially
// by a single caller; nothing here is synchronized.

/// Per-sequence bookkeeping shared between the controller, the backoff
/// engine, and the timeout adjuster.
#[derive(Debug, Clone)]
pub struct RetryState {
    /// Timestamp anchoring the time budget; set once at construction.
    pub start_timestamp: f64,
    /// Timestamp of the most recent logged attempt. Unset before any
    /// attempt; defaulted to `start_timestamp` on first use so the first
    /// attempt's own runtime does not inflate the first delay.
    pub last_timestamp: Option<f64>,
    /// Attempts logged so far, including attempts logged after exhaustion.
    pub attempts: u32,
    /// The most recently returned delay value.
    pub last_delay: Option<f64>,
    /// The most recently returned timeout value; returned verbatim by the
    /// timeout accessor until the next attempt is logged.
    pub last_timeout: Option<f64>,
}

impl RetryState {
    /// Create fresh bookkeeping anchored at `start_timestamp`.
    pub fn new(start_timestamp: f64) -> Self {
        Self {
            start_timestamp,
            last_timestamp: None,
            attempts: 0,
            last_delay: None,
            last_timeout: None,
        }
    }

    /// Record one logged attempt at `timestamp`.
    pub fn log_attempt(&mut self, timestamp: f64) {
        self.attempts += 1;
        self.last_timestamp = Some(timestamp);
    }
}
