//! Parallelism configuration for per-scenario matching.
//!
//! Scenario resolution runs on a bounded rayon pool so the number of
//! in-flight matcher calls never exceeds what the backend tolerates.

use serde::{Deserialize, Serialize};

/// Default value for parallel processing enabled
fn default_enabled() -> bool {
    true
}

/// Configuration for parallel matching.
///
/// # Example
///
/// ```rust
/// use gapmap::config::ParallelConfig;
///
/// let config = ParallelConfig {
///     enabled: true,
///     max_concurrency: Some(4),
/// };
/// assert_eq!(config.effective_concurrency(), 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParallelConfig {
    /// Enable parallel processing (default: true)
    ///
    /// When disabled, scenarios are resolved one at a time.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum concurrent matcher calls (default: available cores)
    ///
    /// Size this to the external matcher's rate limit.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_concurrency: None,
        }
    }
}

impl ParallelConfig {
    /// Create a config with parallel processing disabled.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Create a config bounded to `jobs` workers; `0` means all cores.
    pub fn with_jobs(jobs: usize) -> Self {
        Self {
            enabled: true,
            max_concurrency: (jobs > 0).then_some(jobs),
        }
    }

    /// Get the effective concurrency level.
    pub fn effective_concurrency(&self) -> usize {
        if !self.enabled {
            return 1;
        }
        self.max_concurrency.unwrap_or_else(num_cpus).max(1)
    }

    pub fn validate(&self) -> Result<(), String> {
        match self.max_concurrency {
            Some(0) => Err("parallel.max_concurrency must be at least 1".to_string()),
            _ => Ok(()),
        }
    }
}

/// Returns the number of available CPU cores.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}
