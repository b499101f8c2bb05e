//! Report model handed to downstream consumers (CI gates, dashboards,
//! renderers). `ServiceSummary` is the only artifact a run produces.

use super::types::{ApiKey, OrphanApi, OrphanTest, ScenarioVerdict};
use super::Priority;
use serde::{Deserialize, Serialize};

/// Kind of traceability shortfall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapKind {
    /// Baseline scenario with no adequate test.
    NotCovered,
    /// Baseline scenario with a test that only partially matches.
    Partial,
    /// Suggested scenario absent from the baseline.
    NotCoveredSuggested,
    /// Business-level test with no baseline scenario.
    OrphanUnitTest,
    /// Endpoint with neither scenarios nor tests.
    OrphanApi,
}

impl std::fmt::Display for GapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GapKind::NotCovered => "NOT_COVERED",
            GapKind::Partial => "PARTIAL",
            GapKind::NotCoveredSuggested => "NOT_COVERED_SUGGESTED",
            GapKind::OrphanUnitTest => "ORPHAN_UNIT_TEST",
            GapKind::OrphanApi => "ORPHAN_API",
        };
        f.write_str(s)
    }
}

/// Unified gap record, always reported sorted P0 first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub api_key: ApiKey,
    pub priority: Priority,
    pub kind: GapKind,
    /// Scenario or test id the gap refers to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    pub description: String,
    pub recommendation: String,
    #[serde(default)]
    pub matcher_unavailable: bool,
}

/// Gap counts per priority tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityHistogram {
    #[serde(rename = "P0")]
    pub p0: usize,
    #[serde(rename = "P1")]
    pub p1: usize,
    #[serde(rename = "P2")]
    pub p2: usize,
    #[serde(rename = "P3")]
    pub p3: usize,
}

impl PriorityHistogram {
    pub fn record(&mut self, priority: Priority) {
        match priority {
            Priority::P0 => self.p0 += 1,
            Priority::P1 => self.p1 += 1,
            Priority::P2 => self.p2 += 1,
            Priority::P3 => self.p3 += 1,
        }
    }

    pub fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::P0 => self.p0,
            Priority::P1 => self.p1,
            Priority::P2 => self.p2,
            Priority::P3 => self.p3,
        }
    }

    pub fn total(&self) -> usize {
        self.p0 + self.p1 + self.p2 + self.p3
    }

    /// Number of gaps at `threshold` or more urgent.
    pub fn at_or_above(&self, threshold: Priority) -> usize {
        Priority::ALL
            .iter()
            .filter(|p| p.is_at_least(threshold))
            .map(|p| self.get(*p))
            .sum()
    }
}

/// Scenario verdict tallies over active baseline scenarios.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub active_scenarios: usize,
    pub fully_covered: usize,
    pub partially_covered: usize,
    pub not_covered: usize,
}

impl VerdictCounts {
    /// `100 * fully / active`, or `None` when there is nothing to measure.
    pub fn coverage_percent(&self) -> Option<f64> {
        if self.active_scenarios == 0 {
            None
        } else {
            Some(100.0 * self.fully_covered as f64 / self.active_scenarios as f64)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiStatus {
    Tracked,
    Orphan,
}

/// Per-endpoint rollup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiSummary {
    pub api_key: ApiKey,
    pub status: ApiStatus,
    #[serde(flatten)]
    pub counts: VerdictCounts,
    pub coverage_percent: Option<f64>,
    pub missing_suggestions: usize,
    pub business_orphan_tests: usize,
    pub technical_orphan_tests: usize,
    /// Suggested scenarios exist that the baseline lacks. Informational
    /// unless the downgrade policy is active.
    pub baseline_incomplete: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopedEntity {
    Scenario,
    Test,
}

/// A scenario or test whose API key is not among the known APIs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeMismatch {
    pub entity: ScopedEntity,
    pub id: String,
    pub api_key: ApiKey,
}

/// Service-wide result of one reconciliation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// `None` when there are no active baseline scenarios at all.
    pub coverage_percent: Option<f64>,
    pub counts: VerdictCounts,
    pub scenario_verdicts: Vec<ScenarioVerdict>,
    pub gaps: Vec<Gap>,
    pub orphan_tests: Vec<OrphanTest>,
    pub orphan_apis: Vec<OrphanApi>,
    pub api_summaries: Vec<ApiSummary>,
    pub priority_histogram: PriorityHistogram,
    /// Gaps that should block a release: every gap except technical orphan
    /// tests, which never enter the gap list.
    pub blocking_gaps: usize,
    pub scope_mismatches: Vec<ScopeMismatch>,
    pub matcher_unavailable_count: usize,
}

impl ServiceSummary {
    pub fn gaps_of_kind(&self, kind: GapKind) -> impl Iterator<Item = &Gap> {
        self.gaps.iter().filter(move |gap| gap.kind == kind)
    }

    pub fn api_summary(&self, key: &ApiKey) -> Option<&ApiSummary> {
        self.api_summaries.iter().find(|s| &s.api_key == key)
    }

    /// True if any gap is at `threshold` or more urgent.
    pub fn has_blocking_gaps_at(&self, threshold: Priority) -> bool {
        self.priority_histogram.at_or_above(threshold) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts() {
        let mut histogram = PriorityHistogram::default();
        histogram.record(Priority::P0);
        histogram.record(Priority::P2);
        histogram.record(Priority::P2);

        assert_eq!(histogram.get(Priority::P2), 2);
        assert_eq!(histogram.total(), 3);
        assert_eq!(histogram.at_or_above(Priority::P1), 1);
        assert_eq!(histogram.at_or_above(Priority::P3), 3);
    }

    #[test]
    fn test_histogram_serializes_tier_names() {
        let json = serde_json::to_value(PriorityHistogram::default()).unwrap();
        assert!(json.get("P0").is_some());
        assert!(json.get("P3").is_some());
    }

    #[test]
    fn test_coverage_percent_none_without_scenarios() {
        assert_eq!(VerdictCounts::default().coverage_percent(), None);
    }

    #[test]
    fn test_coverage_percent_counts_only_fully_covered() {
        let counts = VerdictCounts {
            active_scenarios: 4,
            fully_covered: 1,
            partially_covered: 2,
            not_covered: 1,
        };
        assert_eq!(counts.coverage_percent(), Some(25.0));
    }
}
