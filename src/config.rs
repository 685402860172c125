//! Configuration for retry timing
//!
//! The first four fields drive the adaptive timeout layer; the remaining
//! fields are forwarded to the backoff engine at construction and are opaque
//! to the timeout computations.

use crate::constants::*;
use crate::error::{ConfigError, ConfigResult};

/// Immutable configuration for a retry timing sequence.
#[derive(Debug, Clone)]
pub struct RetryTimingConfig {
    /// Total wall-clock budget for the whole retry sequence, in seconds.
    /// Zero disables per-attempt timeouts entirely.
    pub max_actual_duration: f64,
    /// Fraction of the remaining budget allotted to the next attempt's
    /// timeout, in `[0, 1]`.
    pub adjust_timeout_factor: f64,
    /// Floor on any computed timeout. May push total usage past
    /// `max_actual_duration` by up to this amount.
    pub min_adjust_timeout: f64,
    /// Symmetric jitter fraction applied to computed timeouts, in
    /// `[0, 0.5]`.
    pub timeout_jitter_factor: f64,

    /// Maximum number of attempts before the engine aborts (0 = unlimited).
    pub max_attempts: u32,
    /// Symmetric jitter fraction applied to backoff delays, in `[0, 0.5]`.
    pub jitter_factor: f64,
    /// Delay for the first backoff step, in seconds.
    pub initial_delay: f64,
    /// Base of the backoff exponent.
    pub exponent_base: f64,
    /// Delay returned after a successful attempt, in seconds.
    pub delay_on_success: f64,
    /// Lower bound on backoff delays, in seconds.
    pub min_delay: f64,
    /// Optional upper bound on backoff delays, in seconds.
    pub max_delay: Option<f64>,
    /// Whether the engine subtracts the time an attempt actually consumed
    /// from the next computed delay.
    pub consider_actual_delay: bool,
}

impl Default for RetryTimingConfig {
    fn default() -> Self {
        Self {
            max_actual_duration: DEFAULT_MAX_ACTUAL_DURATION,
            adjust_timeout_factor: DEFAULT_ADJUST_TIMEOUT_FACTOR,
            min_adjust_timeout: DEFAULT_MIN_ADJUST_TIMEOUT,
            timeout_jitter_factor: DEFAULT_TIMEOUT_JITTER_FACTOR,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            jitter_factor: DEFAULT_JITTER_FACTOR,
            initial_delay: DEFAULT_INITIAL_DELAY,
            exponent_base: DEFAULT_EXPONENT_BASE,
            delay_on_success: DEFAULT_DELAY_ON_SUCCESS,
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: None,
            consider_actual_delay: false,
        }
    }
}

fn require_non_negative(value: f64, name: &str) -> ConfigResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::invalid(format!(
            "{name} must be a non-negative finite number, got {value}"
        )));
    }
    Ok(())
}

impl RetryTimingConfig {
    /// Create a configuration builder.
    pub fn builder() -> RetryTimingConfigBuilder {
        RetryTimingConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// Out-of-range values are rejected here, at construction time; the
    /// timing computations themselves never fail.
    pub fn validate(&self) -> ConfigResult<()> {
        require_non_negative(self.max_actual_duration, "max_actual_duration")?;
        require_non_negative(self.min_adjust_timeout, "min_adjust_timeout")?;
        require_non_negative(self.initial_delay, "initial_delay")?;
        require_non_negative(self.exponent_base, "exponent_base")?;
        require_non_negative(self.delay_on_success, "delay_on_success")?;
        require_non_negative(self.min_delay, "min_delay")?;

        if !(0.0..=1.0).contains(&self.adjust_timeout_factor) {
            return Err(ConfigError::invalid(format!(
                "adjust_timeout_factor must be between 0 and 1, got {}",
                self.adjust_timeout_factor
            )));
        }
        if !(0.0..=MAX_JITTER_FACTOR).contains(&self.timeout_jitter_factor) {
            return Err(ConfigError::invalid(format!(
                "timeout_jitter_factor must be between 0 and {}, got {}",
                MAX_JITTER_FACTOR, self.timeout_jitter_factor
            )));
        }
        if !(0.0..=MAX_JITTER_FACTOR).contains(&self.jitter_factor) {
            return Err(ConfigError::invalid(format!(
                "jitter_factor must be between 0 and {}, got {}",
                MAX_JITTER_FACTOR, self.jitter_factor
            )));
        }
        if let Some(max_delay) = self.max_delay {
            require_non_negative(max_delay, "max_delay")?;
            if max_delay < self.min_delay {
                return Err(ConfigError::invalid(format!(
                    "max_delay ({max_delay}) cannot be less than min_delay ({})",
                    self.min_delay
                )));
            }
        }

        Ok(())
    }
}

/// Builder for `RetryTimingConfig` with a fluent API.
#[derive(Debug)]
pub struct RetryTimingConfigBuilder {
    config: RetryTimingConfig,
}

impl Default for RetryTimingConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryTimingConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryTimingConfig::default() }
    }

    pub fn max_actual_duration(mut self, secs: f64) -> Self {
        self.config.max_actual_duration = secs;
        self
    }

    /// Disable per-attempt timeouts for this sequence.
    pub fn timeouts_disabled(mut self) -> Self {
        self.config.max_actual_duration = 0.0;
        self
    }

    pub fn adjust_timeout_factor(mut self, factor: f64) -> Self {
        self.config.adjust_timeout_factor = factor;
        self
    }

    pub fn min_adjust_timeout(mut self, secs: f64) -> Self {
        self.config.min_adjust_timeout = secs;
        self
    }

    pub fn timeout_jitter_factor(mut self, factor: f64) -> Self {
        self.config.timeout_jitter_factor = factor;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn jitter_factor(mut self, factor: f64) -> Self {
        self.config.jitter_factor = factor;
        self
    }

    /// Disable all jitter, for deterministic behavior.
    pub fn no_jitter(mut self) -> Self {
        self.config.jitter_factor = 0.0;
        self.config.timeout_jitter_factor = 0.0;
        self
    }

    pub fn initial_delay(mut self, secs: f64) -> Self {
        self.config.initial_delay = secs;
        self
    }

    pub fn exponent_base(mut self, base: f64) -> Self {
        self.config.exponent_base = base;
        self
    }

    pub fn delay_on_success(mut self, secs: f64) -> Self {
        self.config.delay_on_success = secs;
        self
    }

    pub fn min_delay(mut self, secs: f64) -> Self {
        self.config.min_delay = secs;
        self
    }

    pub fn max_delay(mut self, secs: f64) -> Self {
        self.config.max_delay = Some(secs);
        self
    }

    pub fn consider_actual_delay(mut self, consider: bool) -> Self {
        self.config.consider_actual_delay = consider;
        self
    }

    pub fn build(self) -> ConfigResult<RetryTimingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(RetryTimingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let config = RetryTimingConfig::default();
        assert_eq!(config.max_actual_duration, 50.0);
        assert_eq!(config.adjust_timeout_factor, 0.5);
        assert_eq!(config.min_adjust_timeout, 5.0);
        assert_eq!(config.max_attempts, 0);
        assert_eq!(config.max_delay, None);
        assert!(!config.consider_actual_delay);
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = RetryTimingConfig::builder()
            .max_actual_duration(30.0)
            .adjust_timeout_factor(0.4)
            .min_adjust_timeout(2.0)
            .no_jitter()
            .max_attempts(8)
            .initial_delay(1.0)
            .exponent_base(2.0)
            .delay_on_success(0.5)
            .min_delay(0.1)
            .max_delay(20.0)
            .consider_actual_delay(true)
            .build()
            .expect("valid config should build");

        assert_eq!(config.max_actual_duration, 30.0);
        assert_eq!(config.adjust_timeout_factor, 0.4);
        assert_eq!(config.timeout_jitter_factor, 0.0);
        assert_eq!(config.jitter_factor, 0.0);
        assert_eq!(config.max_attempts, 8);
        assert_eq!(config.max_delay, Some(20.0));
        assert!(config.consider_actual_delay);
    }

    #[test]
    fn test_adjust_timeout_factor_out_of_range() {
        let result = RetryTimingConfig::builder().adjust_timeout_factor(1.5).build();
        assert!(result.is_err());

        let result = RetryTimingConfig::builder().adjust_timeout_factor(-0.1).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_jitter_factors_out_of_range() {
        let result = RetryTimingConfig::builder().timeout_jitter_factor(0.6).build();
        assert!(result.is_err());

        let result = RetryTimingConfig::builder().jitter_factor(0.51).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_boundary_jitter_factors_accepted() {
        assert!(RetryTimingConfig::builder().timeout_jitter_factor(0.0).build().is_ok());
        assert!(RetryTimingConfig::builder().timeout_jitter_factor(0.5).build().is_ok());
    }

    #[test]
    fn test_negative_durations_rejected() {
        assert!(RetryTimingConfig::builder().max_actual_duration(-1.0).build().is_err());
        assert!(RetryTimingConfig::builder().min_adjust_timeout(-1.0).build().is_err());
        assert!(RetryTimingConfig::builder().initial_delay(-1.0).build().is_err());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(RetryTimingConfig::builder().max_actual_duration(f64::NAN).build().is_err());
        assert!(RetryTimingConfig::builder().adjust_timeout_factor(f64::NAN).build().is_err());
    }

    #[test]
    fn test_max_delay_below_min_delay_rejected() {
        let result = RetryTimingConfig::builder().min_delay(5.0).max_delay(1.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_timeouts_disabled_shortcut() {
        let config = RetryTimingConfig::builder().timeouts_disabled().build().unwrap();
        assert_eq!(config.max_actual_duration, 0.0);
    }
}
