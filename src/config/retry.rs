//! Retry and timeout configuration for similarity matcher calls.
//!
//! Every matcher call is bounded by `timeout_ms`. A failed or timed-out call
//! is retried at most once before the comparison is declared unavailable;
//! `max_retries = 0` turns the retry off.
//!
//! # Configuration Example
//!
//! ```toml
//! [retry]
//! timeout_ms = 10000
//! max_retries = 1
//! base_delay_ms = 50
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for `max_retries`: a comparison gets at most two attempts.
pub const MAX_RETRIES: u32 = 1;

/// Retry configuration for matcher calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Upper bound for a single matcher call in milliseconds (default: 10000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after the first failed attempt, 0 or 1 (default: 1)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause before the retry in milliseconds (default: 50)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    /// A config that never retries.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Get the per-call timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Pause before the retry, never longer than a whole call may take.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms.min(self.timeout_ms))
    }

    /// Check if another attempt is allowed after `failed_attempts` failures.
    ///
    /// Clamped to [`MAX_RETRIES`] so an unvalidated config cannot widen it.
    pub fn should_retry(&self, failed_attempts: u32) -> bool {
        failed_attempts <= self.max_retries.min(MAX_RETRIES)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("retry.timeout_ms must be greater than zero".to_string());
        }
        if self.max_retries > MAX_RETRIES {
            return Err(format!(
                "retry.max_retries must be 0 or {MAX_RETRIES}, got {}",
                self.max_retries
            ));
        }
        Ok(())
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    1
}

fn default_base_delay_ms() -> u64 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_default_is_single_retry() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.retry_delay(), Duration::from_millis(50));
    }

    #[test]
    fn test_should_retry_once() {
        let config = RetryConfig::default();
        assert!(config.should_retry(1));
        assert!(!config.should_retry(2));
        assert!(!RetryConfig::no_retries().should_retry(1));
    }

    #[test]
    fn test_should_retry_clamps_unvalidated_config() {
        let config = RetryConfig {
            max_retries: 4,
            ..Default::default()
        };
        assert!(config.should_retry(1));
        assert!(!config.should_retry(2));
    }

    #[test]
    fn test_retry_delay_capped_by_timeout() {
        let config = RetryConfig {
            base_delay_ms: 500,
            timeout_ms: 200,
            ..Default::default()
        };
        assert_eq!(config.retry_delay(), Duration::from_millis(200));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = RetryConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(RetryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_more_than_one_retry() {
        let config: RetryConfig = toml::from_str("max_retries = 4").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("max_retries"));
        assert!(RetryConfig::no_retries().validate().is_ok());
    }
}
