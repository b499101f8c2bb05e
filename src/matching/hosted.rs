//! HTTP client for a hosted text-comparison service.
//!
//! Every request is bounded by `retry.timeout_ms`, the same limit the guard
//! applies to a single comparison. A stalled request surfaces as
//! [`MatcherError::Timeout`].

use super::{MatcherError, SimilarityMatcher, SimilarityScore};
use crate::config::{MatcherConfig, RetryConfig};
use crate::core::{Error, Result};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Client for a hosted text-comparison service.
///
/// Request: `POST {endpoint}` with `{"text", "candidates", "model"?}`.
/// Response: `{"results": [{"best_index", "score"}]}`.
pub struct HostedMatcher {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: Option<String>,
    model: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct CompareResponse {
    results: Vec<SimilarityScore>,
}

impl HostedMatcher {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            model,
            timeout,
        })
    }

    pub fn from_config(config: &MatcherConfig, retry: &RetryConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                Error::Configuration("matcher.endpoint is required for the hosted backend".into())
            })?;

        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "Hosted matcher API key not set, sending unauthenticated requests"
            );
        }

        Self::new(endpoint, api_key, config.model.clone(), retry.timeout())
    }
}

impl SimilarityMatcher for HostedMatcher {
    fn name(&self) -> &str {
        "hosted"
    }

    fn compare(
        &self,
        text: &str,
        candidates: &[String],
    ) -> std::result::Result<Vec<SimilarityScore>, MatcherError> {
        let body = json!({
            "text": text,
            "candidates": candidates,
            "model": self.model,
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                MatcherError::Timeout(self.timeout)
            } else {
                MatcherError::Transport(format!("Request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            return Err(MatcherError::Backend(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let parsed: CompareResponse = response
            .json()
            .map_err(|e| MatcherError::InvalidResponse(format!("Failed to parse JSON: {}", e)))?;

        Ok(parsed.results)
    }
}
