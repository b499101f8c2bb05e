//! Deterministic token-overlap similarity.
//!
//! Score = `0.7 * jaccard(tokens) + 0.3 * edit similarity`, where tokens are
//! lowercase words with camelCase/snake_case split and filler words removed,
//! and edit similarity is the normalized Levenshtein distance between the
//! space-joined token sequences.

use super::{MatcherError, SimilarityMatcher, SimilarityScore};
use std::collections::HashSet;

const TOKEN_WEIGHT: f64 = 0.7;
const EDIT_WEIGHT: f64 = 0.3;

/// Words that carry no behavioral meaning in scenario or test names.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "be", "for", "given", "is", "it", "of", "on", "or", "should", "test",
    "the", "then", "to", "when",
];

#[derive(Debug, Clone, Default)]
pub struct HeuristicMatcher;

impl HeuristicMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Similarity of two texts in `[0, 1]`.
    pub fn similarity(&self, left: &str, right: &str) -> f64 {
        let left_tokens = tokenize(left);
        let right_tokens = tokenize(right);
        if left_tokens.is_empty() || right_tokens.is_empty() {
            return 0.0;
        }

        let jaccard = jaccard(&left_tokens, &right_tokens);
        let edit = edit_similarity(&left_tokens.join(" "), &right_tokens.join(" "));

        (TOKEN_WEIGHT * jaccard + EDIT_WEIGHT * edit).clamp(0.0, 1.0)
    }
}

impl SimilarityMatcher for HeuristicMatcher {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn compare(
        &self,
        text: &str,
        candidates: &[String],
    ) -> Result<Vec<SimilarityScore>, MatcherError> {
        Ok(candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| SimilarityScore {
                index,
                score: self.similarity(text, candidate),
            })
            .collect())
    }
}

/// Split text into normalized word tokens, preserving order.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .flat_map(split_camel_case)
        .map(|token| token.to_lowercase())
        .filter(|token| token.chars().count() > 1 && !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

/// Split camelCase/PascalCase words, keeping acronyms together
/// (`"getHTTPStatus"` -> `get`, `HTTP`, `Status`).
fn split_camel_case(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
        let next_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
        let case_boundary = ch.is_uppercase() && (prev_lower || next_lower);
        let digit_boundary = i > 0 && ch.is_ascii_digit() != chars[i - 1].is_ascii_digit();
        let boundary = !current.is_empty() && (case_boundary || digit_boundary);

        if boundary {
            parts.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn jaccard(left: &[String], right: &[String]) -> f64 {
    let left: HashSet<&str> = left.iter().map(String::as_str).collect();
    let right: HashSet<&str> = right.iter().map(String::as_str).collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

fn edit_similarity(left: &str, right: &str) -> f64 {
    let longest = left.chars().count().max(right.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(left, right) as f64 / longest as f64
}

fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s2: Vec<char> = s2.chars().collect();
    let mut previous: Vec<usize> = (0..=s2.len()).collect();
    let mut current = vec![0; s2.len() + 1];

    for (i, c1) in s1.chars().enumerate() {
        current[0] = i + 1;
        for (j, c2) in s2.iter().enumerate() {
            let cost = usize::from(c1 != *c2);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[s2.len()]
}
