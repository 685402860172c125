// Error types for retry timing configuration
use thiserror::Error;

/// Configuration error raised at construction time.
///
/// Out-of-range factors and negative durations are rejected up front; once a
/// configuration validates, the timing computations never fail. Exhaustion of
/// the retry budget is communicated as data (the abort sentinel), not as an
/// error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid { message: message.into() }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
