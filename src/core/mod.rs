//! Core data model shared by every stage of a reconciliation run.
//!
//! Entities arrive from external collaborators (API discovery, test
//! discovery, the baseline/spec loader) and are treated as read-only. Every
//! derived value (match results, verdicts, orphans, gaps) is rebuilt from
//! scratch on each run.

pub mod cancellation;
pub mod errors;
pub mod summary;
pub mod types;

use serde::{Deserialize, Serialize};

pub use cancellation::CancellationToken;
pub use errors::{Error, Result, ResultExt};
pub use summary::{
    ApiStatus, ApiSummary, Gap, GapKind, PriorityHistogram, ScopeMismatch, ScopedEntity,
    ServiceSummary, VerdictCounts,
};
pub use types::{
    Api, ApiKey, CategoryTag, Confidence, CoverageVerdict, MatchResult, OrphanApi, OrphanTest,
    Scenario, ScenarioId, ScenarioSource, ScenarioVerdict, Test, TestCategory, TestId,
};

/// Priority tier assigned to scenarios, tests and gaps.
///
/// Ordering follows urgency: `P0 < P1 < P2 < P3`, so an ascending sort puts
/// the most urgent items first.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, Ord, PartialOrd)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    /// All tiers, most urgent first.
    pub const ALL: [Priority; 4] = [Priority::P0, Priority::P1, Priority::P2, Priority::P3];

    /// Human readable label used in recommendations and terminal output.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::P0 => "critical",
            Priority::P1 => "high",
            Priority::P2 => "medium",
            Priority::P3 => "low",
        }
    }

    /// True when `self` is at least as urgent as `threshold`.
    pub fn is_at_least(&self, threshold: Priority) -> bool {
        *self <= threshold
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(Priority, &str)] = &[
            (Priority::P0, "P0"),
            (Priority::P1, "P1"),
            (Priority::P2, "P2"),
            (Priority::P3, "P3"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(p, _)| p == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P0" => Ok(Priority::P0),
            "P1" => Ok(Priority::P1),
            "P2" => Ok(Priority::P2),
            "P3" => Ok(Priority::P3),
            other => Err(format!("unknown priority '{other}' (expected P0-P3)")),
        }
    }
}
