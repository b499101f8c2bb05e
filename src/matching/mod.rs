//! Similarity matching capability.
//!
//! The engine only depends on [`SimilarityMatcher`]'s output contract: for a
//! text and a list of candidates, a ranked list of `(index, score)` pairs with
//! scores in `[0, 1]`. Two interchangeable backends exist:
//!
//! - [`HeuristicMatcher`]: local, deterministic token-overlap scorer
//! - [`HostedMatcher`]: remote text-comparison service over HTTP
//!
//! [`GuardedMatcher`] wraps either one with the per-call timeout, the retry
//! policy and a per-run result cache.

pub mod guarded;
pub mod heuristic;
pub mod hosted;

pub use guarded::{GuardedMatcher, MatchOutcome};
pub use heuristic::{tokenize, HeuristicMatcher};
pub use hosted::HostedMatcher;

use crate::config::{MatcherBackend, MatcherConfig, RetryConfig};
use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error as ThisError;

/// Similarity of one candidate to the compared text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    #[serde(rename = "best_index")]
    pub index: usize,
    pub score: f64,
}

/// Failure of a single matcher call.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum MatcherError {
    #[error("matcher call timed out after {0:?}")]
    Timeout(Duration),
    #[error("matcher transport failure: {0}")]
    Transport(String),
    #[error("matcher returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("matcher backend error: {0}")]
    Backend(String),
}

/// Text similarity capability.
///
/// Implementations must return scores in `[0, 1]` that grow with perceived
/// relevance, and must be stable for identical inputs within a run.
pub trait SimilarityMatcher: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Score `text` against each candidate. The result may be partial or
    /// unordered; callers rank it themselves.
    fn compare(
        &self,
        text: &str,
        candidates: &[String],
    ) -> std::result::Result<Vec<SimilarityScore>, MatcherError>;
}

/// Reject responses that break the output contract.
pub fn validate_scores(
    scores: &[SimilarityScore],
    candidate_count: usize,
) -> std::result::Result<(), MatcherError> {
    for s in scores {
        if s.index >= candidate_count {
            return Err(MatcherError::InvalidResponse(format!(
                "index {} out of range for {} candidates",
                s.index, candidate_count
            )));
        }
        if !s.score.is_finite() || !(0.0..=1.0).contains(&s.score) {
            return Err(MatcherError::InvalidResponse(format!(
                "score {} outside [0, 1]",
                s.score
            )));
        }
    }
    Ok(())
}

/// Rank scores best first; equal scores keep the lower index first.
pub fn rank_scores(mut scores: Vec<SimilarityScore>) -> Vec<SimilarityScore> {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    scores
}

/// Build the backend selected by configuration.
pub fn build_matcher(
    config: &MatcherConfig,
    retry: &RetryConfig,
) -> Result<Arc<dyn SimilarityMatcher>> {
    config.validate().map_err(Error::Configuration)?;
    match config.backend {
        MatcherBackend::Heuristic => Ok(Arc::new(HeuristicMatcher::new())),
        MatcherBackend::Hosted => Ok(Arc::new(HostedMatcher::from_config(config, retry)?)),
    }
}
