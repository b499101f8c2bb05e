//! Deterministic [`SimilarityMatcher`] doubles.
//!
//! | Matcher | Behavior |
//! |---------|----------|
//! | [`ScriptedMatcher`] | Fixed score per `(text, candidate)` pair, default otherwise |
//! | [`FailingMatcher`] | Every call fails |
//! | [`FlakyMatcher`] | First N calls fail, then delegates |
//! | [`SlowMatcher`] | Sleeps before answering (timeout tests) |

use crate::matching::{MatcherError, SimilarityMatcher, SimilarityScore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Matcher answering from a fixed score table.
#[derive(Debug, Default)]
pub struct ScriptedMatcher {
    scores: HashMap<(String, String), f64>,
    default_score: f64,
    calls: AtomicUsize,
}

impl ScriptedMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score returned when `text` is compared against `candidate`.
    pub fn with_score(mut self, text: &str, candidate: &str, score: f64) -> Self {
        self.scores
            .insert((text.to_string(), candidate.to_string()), score);
        self
    }

    /// Score for pairs without an explicit entry (default 0.0).
    pub fn with_default(mut self, score: f64) -> Self {
        self.default_score = score;
        self
    }

    /// Number of `compare` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SimilarityMatcher for ScriptedMatcher {
    fn name(&self) -> &str {
        "scripted"
    }

    fn compare(
        &self,
        text: &str,
        candidates: &[String],
    ) -> Result<Vec<SimilarityScore>, MatcherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| SimilarityScore {
                index,
                score: self
                    .scores
                    .get(&(text.to_string(), candidate.clone()))
                    .copied()
                    .unwrap_or(self.default_score),
            })
            .collect())
    }
}

/// Matcher whose backend is always down.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingMatcher;

impl SimilarityMatcher for FailingMatcher {
    fn name(&self) -> &str {
        "failing"
    }

    fn compare(&self, _: &str, _: &[String]) -> Result<Vec<SimilarityScore>, MatcherError> {
        Err(MatcherError::Transport("connection refused".to_string()))
    }
}

/// Fails the first `failures` calls, then delegates.
pub struct FlakyMatcher<M> {
    remaining_failures: AtomicUsize,
    inner: M,
}

impl<M: SimilarityMatcher> FlakyMatcher<M> {
    pub fn new(failures: usize, inner: M) -> Self {
        Self {
            remaining_failures: AtomicUsize::new(failures),
            inner,
        }
    }
}

impl<M: SimilarityMatcher> SimilarityMatcher for FlakyMatcher<M> {
    fn name(&self) -> &str {
        "flaky"
    }

    fn compare(
        &self,
        text: &str,
        candidates: &[String],
    ) -> Result<Vec<SimilarityScore>, MatcherError> {
        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(MatcherError::Backend("temporarily unavailable".to_string()));
        }
        self.inner.compare(text, candidates)
    }
}

/// Sleeps for `delay`, then scores every candidate 1.0.
#[derive(Debug, Clone, Copy)]
pub struct SlowMatcher {
    delay: Duration,
}

impl SlowMatcher {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl SimilarityMatcher for SlowMatcher {
    fn name(&self) -> &str {
        "slow"
    }

    fn compare(
        &self,
        _: &str,
        candidates: &[String],
    ) -> Result<Vec<SimilarityScore>, MatcherError> {
        std::thread::sleep(self.delay);
        Ok((0..candidates.len())
            .map(|index| SimilarityScore { index, score: 1.0 })
            .collect())
    }
}
