use serde::{Deserialize, Serialize};

use super::categorization::CategorizationConfig;
use super::parallel::ParallelConfig;
use super::retry::RetryConfig;

/// Root configuration structure for gapmap
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GapmapConfig {
    /// Similarity matcher backend selection
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Timeout and retry policy for matcher calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Worker pool sizing
    #[serde(default)]
    pub parallel: ParallelConfig,

    /// Reconciliation policies
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Orphan test categorization rules
    #[serde(default)]
    pub categorization: CategorizationConfig,
}

impl GapmapConfig {
    /// Check every section, reporting the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        self.matcher.validate()?;
        self.retry.validate()?;
        self.parallel.validate()?;
        Ok(())
    }
}

/// Which similarity backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherBackend {
    /// Local deterministic token-overlap scorer
    #[default]
    Heuristic,
    /// Hosted text-comparison service
    Hosted,
}

impl std::str::FromStr for MatcherBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heuristic" => Ok(Self::Heuristic),
            "hosted" => Ok(Self::Hosted),
            other => Err(format!("unknown matcher backend '{other}'")),
        }
    }
}

fn default_api_key_env() -> String {
    "GAPMAP_MATCHER_API_KEY".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatcherConfig {
    #[serde(default)]
    pub backend: MatcherBackend,

    /// Comparison endpoint for the hosted backend
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Environment variable holding the hosted backend's bearer token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model name forwarded to the hosted backend
    #[serde(default)]
    pub model: Option<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            backend: MatcherBackend::default(),
            endpoint: None,
            api_key_env: default_api_key_env(),
            model: None,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<(), String> {
        let has_endpoint = self
            .endpoint
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty());
        if self.backend == MatcherBackend::Hosted && !has_endpoint {
            return Err("matcher.endpoint is required for the hosted backend".to_string());
        }
        Ok(())
    }
}

/// What an incomplete baseline does to scenario verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselinePolicy {
    /// Only flag the API summary; verdicts stay as resolved.
    #[default]
    FlagOnly,
    /// Downgrade FULLY_COVERED scenarios on incomplete APIs to PARTIALLY_COVERED.
    Downgrade,
}

impl std::str::FromStr for BaselinePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "flag_only" => Ok(Self::FlagOnly),
            "downgrade" => Ok(Self::Downgrade),
            other => Err(format!("unknown baseline policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
    #[serde(default)]
    pub baseline_incomplete: BaselinePolicy,
}
