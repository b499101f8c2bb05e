//! Fixed score bands mapping similarity scores to confidence and verdicts.
//!
//! | Score | Confidence | Verdict |
//! |-------|------------|---------|
//! | `>= 0.90` | HIGH (strong) | FULLY_COVERED |
//! | `0.75 ..< 0.90` | HIGH (good) | FULLY_COVERED |
//! | `0.60 ..< 0.75` | MEDIUM | PARTIALLY_COVERED |
//! | `0.40 ..< 0.60` | LOW | NOT_COVERED |
//! | `< 0.40` | NONE | NOT_COVERED |

use crate::core::{Confidence, CoverageVerdict};

pub const STRONG_MATCH_THRESHOLD: f64 = 0.90;
pub const FULL_COVERAGE_THRESHOLD: f64 = 0.75;
pub const PARTIAL_COVERAGE_THRESHOLD: f64 = 0.60;
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.40;

pub fn confidence_for(score: f64) -> Confidence {
    if score >= FULL_COVERAGE_THRESHOLD {
        Confidence::High
    } else if score >= PARTIAL_COVERAGE_THRESHOLD {
        Confidence::Medium
    } else if score >= LOW_CONFIDENCE_THRESHOLD {
        Confidence::Low
    } else {
        Confidence::None
    }
}

pub fn verdict_for(score: f64) -> CoverageVerdict {
    if score >= FULL_COVERAGE_THRESHOLD {
        CoverageVerdict::FullyCovered
    } else if score >= PARTIAL_COVERAGE_THRESHOLD {
        CoverageVerdict::PartiallyCovered
    } else {
        CoverageVerdict::NotCovered
    }
}

/// A test is attached to a match only at or above the partial band.
pub fn claims_test(score: f64) -> bool {
    score >= PARTIAL_COVERAGE_THRESHOLD
}

/// Short qualifier used in match explanations.
pub fn band_label(score: f64) -> &'static str {
    if score >= STRONG_MATCH_THRESHOLD {
        "Strong match"
    } else if score >= FULL_COVERAGE_THRESHOLD {
        "Good match"
    } else if score >= PARTIAL_COVERAGE_THRESHOLD {
        "Partial match"
    } else if score >= LOW_CONFIDENCE_THRESHOLD {
        "Weak match"
    } else {
        "No match"
    }
}
