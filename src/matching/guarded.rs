//! Timeout, retry and caching around a [`SimilarityMatcher`].
//!
//! A guard is built fresh for every run. Its cache therefore never outlives
//! the run, and two runs over different services never share results.

use super::{rank_scores, validate_scores, MatcherError, SimilarityMatcher, SimilarityScore};
use crate::config::RetryConfig;
use crossbeam::channel::{self, RecvTimeoutError};
use dashmap::DashMap;
use std::hash::Hasher;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;
use xxhash_rust::xxh64::Xxh64;

/// Result of a guarded comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// Scores ranked best first.
    Ranked(Vec<SimilarityScore>),
    /// Every attempt failed.
    Unavailable {
        attempts: u32,
        last_error: MatcherError,
    },
}

pub struct GuardedMatcher {
    inner: Arc<dyn SimilarityMatcher>,
    retry: RetryConfig,
    cache: DashMap<u64, Vec<SimilarityScore>>,
    backend_calls: AtomicUsize,
}

impl GuardedMatcher {
    pub fn new(inner: Arc<dyn SimilarityMatcher>, retry: RetryConfig) -> Self {
        Self {
            inner,
            retry,
            cache: DashMap::new(),
            backend_calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls that reached the wrapped backend, retries included.
    pub fn backend_calls(&self) -> usize {
        self.backend_calls.load(Ordering::Relaxed)
    }

    /// Compare `text` against `candidates`, never failing the caller.
    pub fn compare(&self, text: &str, candidates: &[String]) -> MatchOutcome {
        if candidates.is_empty() {
            return MatchOutcome::Ranked(Vec::new());
        }

        let key = cache_key(text, candidates);
        if let Some(hit) = self.cache.get(&key) {
            return MatchOutcome::Ranked(hit.clone());
        }

        let mut failures = 0u32;
        loop {
            let attempt = self
                .call_with_timeout(text, candidates)
                .and_then(|scores| validate_scores(&scores, candidates.len()).map(|_| scores));

            match attempt {
                Ok(scores) => {
                    let ranked = rank_scores(scores);
                    self.cache.insert(key, ranked.clone());
                    return MatchOutcome::Ranked(ranked);
                }
                Err(error) => {
                    failures += 1;
                    warn!(
                        backend = self.inner.name(),
                        attempt = failures,
                        error = %error,
                        "Similarity matcher call failed"
                    );
                    if !self.retry.should_retry(failures) {
                        return MatchOutcome::Unavailable {
                            attempts: failures,
                            last_error: error,
                        };
                    }
                    std::thread::sleep(self.retry.retry_delay());
                }
            }
        }
    }

    fn call_with_timeout(
        &self,
        text: &str,
        candidates: &[String],
    ) -> Result<Vec<SimilarityScore>, MatcherError> {
        self.backend_calls.fetch_add(1, Ordering::Relaxed);

        let (tx, rx) = channel::bounded(1);
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        let candidates = candidates.to_vec();

        std::thread::Builder::new()
            .name("gapmap-matcher".to_string())
            .spawn(move || {
                // Receiver may be gone after a timeout
                let _ = tx.send(inner.compare(&text, &candidates));
            })
            .map_err(|e| MatcherError::Backend(format!("failed to spawn matcher call: {e}")))?;

        let timeout = self.retry.timeout();
        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(MatcherError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(MatcherError::Backend(
                "matcher call terminated without a result".to_string(),
            )),
        }
    }
}

fn cache_key(text: &str, candidates: &[String]) -> u64 {
    let mut hasher = Xxh64::new(0);
    hasher.write_usize(text.len());
    hasher.write(text.as_bytes());
    for candidate in candidates {
        hasher.write_usize(candidate.len());
        hasher.write(candidate.as_bytes());
    }
    hasher.finish()
}
