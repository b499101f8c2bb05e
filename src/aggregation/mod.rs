//! Orphan and gap aggregation into the service summary.
//!
//! Aggregation is strictly sequential and runs only after every verdict and
//! completeness result of the run has been collected. Gaps are emitted in a
//! fixed discovery order (scenario verdicts, missing suggestions, business
//! orphan tests, orphan APIs) and then stably sorted by priority and API key,
//! so the report never depends on the order parallel work completed in.

pub mod categorizer;
pub mod orphans;

pub use categorizer::{RuleTableCategorizer, TestCategorizer};
pub use orphans::{classify_orphan_tests, detect_orphan_apis, ORPHAN_API_DEFAULT_PRIORITY};

use crate::completeness::{CompletenessReport, MissingScenario};
use crate::core::{
    Api, ApiKey, ApiStatus, ApiSummary, CoverageVerdict, Gap, GapKind, OrphanApi, OrphanTest,
    PriorityHistogram, Scenario, ScenarioVerdict, ScopeMismatch, ServiceSummary, Test,
    TestCategory, VerdictCounts,
};
use std::collections::BTreeSet;
use tracing::debug;

/// Everything one run produced before aggregation.
pub struct AggregationInput<'a> {
    pub service: Option<String>,
    pub apis: &'a [Api],
    pub scenarios: &'a [&'a Scenario],
    pub tests: &'a [&'a Test],
    pub verdicts: Vec<ScenarioVerdict>,
    pub completeness: CompletenessReport,
    pub scope_mismatches: Vec<ScopeMismatch>,
}

pub struct OrphanAndGapAggregator<'a> {
    categorizer: &'a dyn TestCategorizer,
}

impl<'a> OrphanAndGapAggregator<'a> {
    pub fn new(categorizer: &'a dyn TestCategorizer) -> Self {
        Self { categorizer }
    }

    pub fn aggregate(&self, input: AggregationInput<'_>) -> ServiceSummary {
        let AggregationInput {
            service,
            apis,
            scenarios,
            tests,
            verdicts,
            completeness,
            scope_mismatches,
        } = input;

        let matcher_unavailable_count = verdicts
            .iter()
            .filter(|v| v.match_result.matcher_unavailable)
            .count()
            + completeness
                .missing
                .iter()
                .filter(|m| m.matcher_unavailable)
                .count()
            + completeness
                .unclaimed
                .iter()
                .filter(|u| u.matcher_unavailable)
                .count();

        let orphan_apis = detect_orphan_apis(apis, scenarios, tests);
        let orphan_keys: BTreeSet<&ApiKey> = orphan_apis.iter().map(|o| &o.api.key).collect();
        let orphan_tests = classify_orphan_tests(completeness.unclaimed, self.categorizer);

        let mut gaps: Vec<Gap> = Vec::new();
        gaps.extend(verdicts.iter().filter_map(verdict_gap));
        gaps.extend(
            completeness
                .missing
                .iter()
                .filter(|m| !orphan_keys.contains(&m.api_key))
                .map(suggestion_gap),
        );
        gaps.extend(
            orphan_tests
                .iter()
                .filter(|o| o.category == TestCategory::Business)
                .map(orphan_test_gap),
        );
        gaps.extend(orphan_apis.iter().map(orphan_api_gap));
        gaps.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.api_key.cmp(&b.api_key))
        });

        let mut priority_histogram = PriorityHistogram::default();
        for gap in &gaps {
            priority_histogram.record(gap.priority);
        }

        let counts = count_verdicts(verdicts.iter());
        let api_summaries = summarize_apis(
            apis,
            &orphan_keys,
            &verdicts,
            &completeness.missing,
            &completeness.incomplete_apis,
            &orphan_tests,
        );

        debug!(
            gaps = gaps.len(),
            orphan_tests = orphan_tests.len(),
            orphan_apis = orphan_apis.len(),
            "Aggregated service summary"
        );

        ServiceSummary {
            service,
            coverage_percent: counts.coverage_percent(),
            counts,
            scenario_verdicts: verdicts,
            blocking_gaps: priority_histogram.total(),
            gaps,
            orphan_tests,
            orphan_apis,
            api_summaries,
            priority_histogram,
            scope_mismatches,
            matcher_unavailable_count,
        }
    }
}

fn count_verdicts<'v>(verdicts: impl Iterator<Item = &'v ScenarioVerdict>) -> VerdictCounts {
    let mut counts = VerdictCounts::default();
    for verdict in verdicts {
        counts.active_scenarios += 1;
        match verdict.verdict {
            CoverageVerdict::FullyCovered => counts.fully_covered += 1,
            CoverageVerdict::PartiallyCovered => counts.partially_covered += 1,
            CoverageVerdict::NotCovered => counts.not_covered += 1,
        }
    }
    counts
}

fn summarize_apis(
    apis: &[Api],
    orphan_keys: &BTreeSet<&ApiKey>,
    verdicts: &[ScenarioVerdict],
    missing: &[MissingScenario],
    incomplete_apis: &BTreeSet<ApiKey>,
    orphan_tests: &[OrphanTest],
) -> Vec<ApiSummary> {
    let mut summaries: Vec<ApiSummary> = apis
        .iter()
        .map(|api| {
            let key = &api.key;
            let counts = count_verdicts(verdicts.iter().filter(|v| &v.api_key == key));
            let orphans_of = |category: TestCategory| {
                orphan_tests
                    .iter()
                    .filter(|o| &o.test.api_key == key && o.category == category)
                    .count()
            };

            ApiSummary {
                api_key: key.clone(),
                status: if orphan_keys.contains(key) {
                    ApiStatus::Orphan
                } else {
                    ApiStatus::Tracked
                },
                coverage_percent: counts.coverage_percent(),
                counts,
                missing_suggestions: missing.iter().filter(|m| &m.api_key == key).count(),
                business_orphan_tests: orphans_of(TestCategory::Business),
                technical_orphan_tests: orphans_of(TestCategory::Technical),
                baseline_incomplete: incomplete_apis.contains(key),
            }
        })
        .collect();

    summaries.sort_by(|a, b| a.api_key.cmp(&b.api_key));
    summaries
}

fn verdict_gap(verdict: &ScenarioVerdict) -> Option<Gap> {
    let result = &verdict.match_result;
    let (kind, description, recommendation) = match verdict.verdict {
        CoverageVerdict::FullyCovered => return None,
        CoverageVerdict::PartiallyCovered => (
            GapKind::Partial,
            format!(
                "Scenario '{}' is only partially covered ({})",
                verdict.text, result.explanation
            ),
            match &result.test_id {
                Some(test_id) => format!("Extend test {test_id} to assert the full scenario"),
                None => "Add assertions that cover the full scenario".to_string(),
            },
        ),
        CoverageVerdict::NotCovered if result.matcher_unavailable => (
            GapKind::NotCovered,
            format!("Scenario '{}' could not be evaluated", verdict.text),
            "Re-run the analysis once the similarity matcher is reachable".to_string(),
        ),
        CoverageVerdict::NotCovered => (
            GapKind::NotCovered,
            format!("Scenario '{}' has no matching test ({})", verdict.text, result.explanation),
            format!("Add a {} priority test for this scenario", verdict.priority.label()),
        ),
    };

    Some(Gap {
        api_key: verdict.api_key.clone(),
        priority: verdict.priority,
        kind,
        subject_id: Some(verdict.scenario_id.clone()),
        description,
        recommendation,
        matcher_unavailable: result.matcher_unavailable,
    })
}

fn suggestion_gap(missing: &MissingScenario) -> Gap {
    Gap {
        api_key: missing.api_key.clone(),
        priority: missing.priority,
        kind: GapKind::NotCoveredSuggested,
        subject_id: Some(missing.scenario_id.clone()),
        description: format!("Suggested scenario '{}' is missing from the baseline", missing.text),
        recommendation: "Review the suggestion and add it to the baseline scenarios".to_string(),
        matcher_unavailable: missing.matcher_unavailable,
    }
}

fn orphan_test_gap(orphan: &OrphanTest) -> Gap {
    let test = &orphan.test;
    let recommendation = match &orphan.suggested_scenario_text {
        Some(text) => format!("Add baseline scenario: {text}"),
        None => "Author a baseline scenario for this test manually".to_string(),
    };

    Gap {
        api_key: test.api_key.clone(),
        priority: orphan.priority,
        kind: GapKind::OrphanUnitTest,
        subject_id: Some(test.id.clone()),
        description: format!(
            "Test '{}' ({}:{}) has no baseline scenario",
            test.description(),
            test.file_path.display(),
            test.line_number
        ),
        recommendation,
        matcher_unavailable: false,
    }
}

fn orphan_api_gap(orphan: &OrphanApi) -> Gap {
    let recommendation = if orphan.suggested_scenarios > 0 {
        format!(
            "Adopt the {} suggested scenario(s) into the baseline and add tests",
            orphan.suggested_scenarios
        )
    } else {
        "Define baseline scenarios and tests for this endpoint".to_string()
    };

    Gap {
        api_key: orphan.api.key.clone(),
        priority: orphan.priority,
        kind: GapKind::OrphanApi,
        subject_id: None,
        description: format!("{} has neither scenarios nor tests", orphan.api.key),
        recommendation,
        matcher_unavailable: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completeness::UnclaimedTest;
    use crate::core::{Confidence, MatchResult, Priority};
    use crate::testkit::{api, suggested, unit_test};
    use pretty_assertions::assert_eq;

    fn verdict(
        id: &str,
        api_key: &str,
        priority: Priority,
        verdict: CoverageVerdict,
    ) -> ScenarioVerdict {
        ScenarioVerdict {
            scenario_id: id.to_string(),
            api_key: ApiKey::from(api_key),
            text: format!("scenario {id}"),
            category: Default::default(),
            priority,
            verdict,
            match_result: MatchResult {
                scenario_id: id.to_string(),
                test_id: None,
                confidence: Confidence::None,
                score: 0.0,
                explanation: "No tests found".to_string(),
                matcher_unavailable: false,
            },
        }
    }

    fn aggregate(input: AggregationInput<'_>) -> ServiceSummary {
        let categorizer = RuleTableCategorizer::default();
        OrphanAndGapAggregator::new(&categorizer).aggregate(input)
    }

    #[test]
    fn test_gaps_sorted_by_priority_then_api_then_discovery() {
        let apis = [api("GET", "/b"), api("GET", "/a")];
        let verdicts = vec![
            verdict("S1", "GET /b", Priority::P2, CoverageVerdict::NotCovered),
            verdict("S2", "GET /b", Priority::P0, CoverageVerdict::PartiallyCovered),
            verdict("S3", "GET /a", Priority::P2, CoverageVerdict::NotCovered),
            verdict("S4", "GET /a", Priority::P2, CoverageVerdict::NotCovered),
            verdict("S5", "GET /a", Priority::P1, CoverageVerdict::FullyCovered),
        ];

        let summary = aggregate(AggregationInput {
            service: None,
            apis: &apis,
            scenarios: &[],
            tests: &[],
            verdicts,
            completeness: CompletenessReport::default(),
            scope_mismatches: vec![],
        });

        let order: Vec<&str> = summary
            .gaps
            .iter()
            .map(|g| g.subject_id.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(order, vec!["S2", "S3", "S4", "S1"]);
        assert_eq!(summary.counts.fully_covered, 1);
        assert_eq!(summary.coverage_percent, Some(20.0));
        assert_eq!(summary.priority_histogram.p2, 3);
        assert_eq!(summary.blocking_gaps, 4);
    }

    #[test]
    fn test_technical_orphans_never_enter_gap_list() {
        let apis = [api("GET", "/a")];
        let technical = unit_test("T1", "GET /a", "maps row", "src/CustomerMapperTest.java", 1);
        let business = unit_test(
            "T2",
            "GET /a",
            "lists customers",
            "src/CustomerControllerTest.java",
            1,
        );
        let tests = [&technical, &business];
        let completeness = CompletenessReport {
            unclaimed: vec![
                UnclaimedTest {
                    test: technical.clone(),
                    suggested_scenario_text: None,
                    matcher_unavailable: false,
                },
                UnclaimedTest {
                    test: business.clone(),
                    suggested_scenario_text: None,
                    matcher_unavailable: true,
                },
            ],
            ..Default::default()
        };

        let summary = aggregate(AggregationInput {
            service: Some("customers".to_string()),
            apis: &apis,
            scenarios: &[],
            tests: &tests,
            verdicts: vec![],
            completeness,
            scope_mismatches: vec![],
        });

        assert_eq!(summary.orphan_tests.len(), 2);
        assert_eq!(summary.gaps.len(), 1);
        assert_eq!(summary.gaps[0].kind, GapKind::OrphanUnitTest);
        assert_eq!(summary.gaps[0].subject_id.as_deref(), Some("T2"));
        assert_eq!(summary.coverage_percent, None);
        assert_eq!(summary.matcher_unavailable_count, 1);

        let api_summary = summary.api_summary(&ApiKey::from("GET /a")).unwrap();
        assert_eq!(api_summary.status, ApiStatus::Tracked);
        assert_eq!(api_summary.business_orphan_tests, 1);
        assert_eq!(api_summary.technical_orphan_tests, 1);
    }

    #[test]
    fn test_orphan_api_folds_its_suggestions() {
        let apis = [api("GET", "/v1/customers/{id}")];
        let suggestion = suggested("A1", "GET /v1/customers/{id}", "get customer by id");
        let scenarios = [&suggestion];
        let completeness = CompletenessReport {
            missing: vec![MissingScenario {
                scenario_id: "A1".to_string(),
                api_key: suggestion.api_key.clone(),
                text: suggestion.text.clone(),
                priority: Priority::P3,
                closest_score: None,
                matcher_unavailable: false,
            }],
            incomplete_apis: BTreeSet::from([suggestion.api_key.clone()]),
            ..Default::default()
        };

        let summary = aggregate(AggregationInput {
            service: None,
            apis: &apis,
            scenarios: &scenarios,
            tests: &[],
            verdicts: vec![],
            completeness,
            scope_mismatches: vec![],
        });

        assert_eq!(summary.gaps.len(), 1);
        assert_eq!(summary.gaps[0].kind, GapKind::OrphanApi);
        assert_eq!(summary.gaps[0].priority, Priority::P3);
        let api_summary = &summary.api_summaries[0];
        assert_eq!(api_summary.status, ApiStatus::Orphan);
        assert_eq!(api_summary.missing_suggestions, 1);
        assert!(api_summary.baseline_incomplete);
    }

    #[test]
    fn test_api_summaries_sorted_by_key() {
        let apis = [api("POST", "/z"), api("GET", "/a"), api("DELETE", "/m")];

        let summary = aggregate(AggregationInput {
            service: None,
            apis: &apis,
            scenarios: &[],
            tests: &[],
            verdicts: vec![],
            completeness: CompletenessReport::default(),
            scope_mismatches: vec![],
        });

        let keys: Vec<&str> = summary
            .api_summaries
            .iter()
            .map(|s| s.api_key.as_str())
            .collect();
        assert_eq!(keys, vec!["DELETE /m", "GET /a", "POST /z"]);
    }
}
