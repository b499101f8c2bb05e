//! Scenario-to-test coverage resolution.
//!
//! Each active baseline scenario is compared against the tests scoped to the
//! same API (never across APIs), and the best score is turned into a verdict
//! through the fixed bands in [`bands`].

pub mod bands;

pub use bands::{
    claims_test, confidence_for, verdict_for, FULL_COVERAGE_THRESHOLD,
    PARTIAL_COVERAGE_THRESHOLD,
};

use crate::core::{
    ApiKey, CancellationToken, Confidence, CoverageVerdict, MatchResult, Result, Scenario,
    ScenarioVerdict, Test,
};
use crate::matching::{GuardedMatcher, MatchOutcome};
use crate::observability::set_current_api;
use crate::priority::scenario_priority;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, debug_span, warn};

pub struct CoverageResolver<'a> {
    matcher: &'a GuardedMatcher,
}

impl<'a> CoverageResolver<'a> {
    pub fn new(matcher: &'a GuardedMatcher) -> Self {
        Self { matcher }
    }

    /// Resolve one baseline scenario. Inactive and suggested scenarios
    /// produce no result.
    ///
    /// Tests scoped to other APIs are ignored even if passed in. Candidates
    /// are ordered by line number then id, so equal scores resolve to the
    /// earliest test.
    pub fn resolve(
        &self,
        scenario: &Scenario,
        candidate_tests: &[&Test],
    ) -> Option<ScenarioVerdict> {
        if !scenario.active || !scenario.is_baseline() {
            return None;
        }

        let mut candidates: Vec<&Test> = candidate_tests
            .iter()
            .copied()
            .filter(|test| test.api_key == scenario.api_key)
            .collect();
        candidates.sort_by(|a, b| {
            a.line_number
                .cmp(&b.line_number)
                .then_with(|| a.id.cmp(&b.id))
        });

        let match_result = if candidates.is_empty() {
            no_candidates(scenario)
        } else {
            let texts: Vec<String> = candidates
                .iter()
                .map(|test| test.description().to_string())
                .collect();
            match self.matcher.compare(&scenario.text, &texts) {
                MatchOutcome::Ranked(scores) => match scores.first() {
                    Some(best) => scored(scenario, candidates[best.index], best.score),
                    None => no_candidates(scenario),
                },
                MatchOutcome::Unavailable {
                    attempts,
                    last_error,
                } => {
                    warn!(
                        scenario = %scenario.id,
                        api = %scenario.api_key,
                        attempts,
                        "Matcher unavailable, verdicting scenario NOT_COVERED"
                    );
                    MatchResult {
                        scenario_id: scenario.id.clone(),
                        test_id: None,
                        confidence: Confidence::None,
                        score: 0.0,
                        explanation: format!(
                            "Could not evaluate: matcher unavailable after \
                             {attempts} attempt(s) ({last_error})"
                        ),
                        matcher_unavailable: true,
                    }
                }
            }
        };

        let verdict = if match_result.matcher_unavailable {
            CoverageVerdict::NotCovered
        } else {
            verdict_for(match_result.score)
        };

        debug!(
            scenario = %scenario.id,
            score = match_result.score,
            verdict = %verdict,
            "Resolved scenario"
        );

        Some(ScenarioVerdict {
            scenario_id: scenario.id.clone(),
            api_key: scenario.api_key.clone(),
            text: scenario.text.clone(),
            category: scenario.category,
            priority: scenario_priority(scenario),
            verdict,
            match_result,
        })
    }

    /// Resolve every scenario on `pool`, checking `cancel` before each one.
    ///
    /// Results come back in input order regardless of completion order.
    pub fn resolve_all(
        &self,
        scenarios: &[&Scenario],
        tests: &[&Test],
        pool: &rayon::ThreadPool,
        cancel: &CancellationToken,
    ) -> Result<Vec<ScenarioVerdict>> {
        let tests_by_api = group_by_api(tests);
        let no_tests: Vec<&Test> = Vec::new();

        let resolved: Vec<Option<ScenarioVerdict>> = pool.install(|| {
            scenarios
                .par_iter()
                .map(|scenario| {
                    cancel.check()?;
                    let _span =
                        debug_span!("resolve", api = %scenario.api_key, scenario = %scenario.id)
                            .entered();
                    let _api = set_current_api(&scenario.api_key);
                    let candidates = tests_by_api.get(&scenario.api_key).unwrap_or(&no_tests);
                    Ok(self.resolve(scenario, candidates))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        Ok(resolved.into_iter().flatten().collect())
    }
}

fn group_by_api<'t>(tests: &[&'t Test]) -> BTreeMap<ApiKey, Vec<&'t Test>> {
    let mut grouped: BTreeMap<ApiKey, Vec<&Test>> = BTreeMap::new();
    for test in tests {
        grouped.entry(test.api_key.clone()).or_default().push(test);
    }
    grouped
}

fn no_candidates(scenario: &Scenario) -> MatchResult {
    MatchResult {
        scenario_id: scenario.id.clone(),
        test_id: None,
        confidence: Confidence::None,
        score: 0.0,
        explanation: format!("No tests found for {}", scenario.api_key),
        matcher_unavailable: false,
    }
}

fn scored(scenario: &Scenario, best: &Test, score: f64) -> MatchResult {
    let label = bands::band_label(score);
    let (test_id, explanation) = if claims_test(score) {
        (
            Some(best.id.clone()),
            format!("{label} with '{}' (score {score:.2})", best.description()),
        )
    } else {
        (
            None,
            format!(
                "{label}: closest test '{}' scored {score:.2}",
                best.description()
            ),
        )
    };

    MatchResult {
        scenario_id: scenario.id.clone(),
        test_id,
        confidence: confidence_for(score),
        score,
        explanation,
        matcher_unavailable: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::testkit::{baseline, inactive, unit_test, FailingMatcher, ScriptedMatcher};
    use std::sync::Arc;

    const CREATE: &str = "POST /v1/customers";

    fn guard(matcher: ScriptedMatcher) -> GuardedMatcher {
        GuardedMatcher::new(Arc::new(matcher), RetryConfig::default())
    }

    #[test]
    fn test_strong_match_is_fully_covered() {
        let matcher = guard(ScriptedMatcher::new().with_score(
            "create customer",
            "creates customer",
            0.93,
        ));
        let resolver = CoverageResolver::new(&matcher);
        let test = unit_test("T1", CREATE, "creates customer", "CustomerControllerTest.java", 12);

        let verdict = resolver
            .resolve(&baseline("S1", CREATE, "create customer"), &[&test])
            .unwrap();

        assert_eq!(verdict.verdict, CoverageVerdict::FullyCovered);
        assert_eq!(verdict.match_result.confidence, Confidence::High);
        assert_eq!(verdict.match_result.test_id.as_deref(), Some("T1"));
        assert!(verdict.match_result.explanation.starts_with("Strong match"));
    }

    #[test]
    fn test_partial_band() {
        let matcher = guard(ScriptedMatcher::new().with_default(0.65));
        let resolver = CoverageResolver::new(&matcher);
        let test = unit_test("T1", CREATE, "creates customer", "A.java", 1);

        let verdict = resolver
            .resolve(&baseline("S1", CREATE, "create customer"), &[&test])
            .unwrap();

        assert_eq!(verdict.verdict, CoverageVerdict::PartiallyCovered);
        assert_eq!(verdict.match_result.confidence, Confidence::Medium);
        assert!(verdict.match_result.test_id.is_some());
    }

    #[test]
    fn test_below_partial_attaches_no_test() {
        let matcher = guard(ScriptedMatcher::new().with_default(0.5));
        let resolver = CoverageResolver::new(&matcher);
        let test = unit_test("T1", CREATE, "creates customer", "A.java", 1);

        let verdict = resolver
            .resolve(&baseline("S1", CREATE, "create customer"), &[&test])
            .unwrap();

        assert_eq!(verdict.verdict, CoverageVerdict::NotCovered);
        assert_eq!(verdict.match_result.confidence, Confidence::Low);
        assert_eq!(verdict.match_result.test_id, None);
    }

    #[test]
    fn test_no_candidates_skips_matcher() {
        let scripted = Arc::new(ScriptedMatcher::new().with_default(1.0));
        let matcher = GuardedMatcher::new(scripted.clone(), RetryConfig::default());
        let resolver = CoverageResolver::new(&matcher);
        let other_api = unit_test("T1", "GET /v1/customers", "create customer", "A.java", 1);

        let verdict = resolver
            .resolve(&baseline("S1", CREATE, "create customer"), &[&other_api])
            .unwrap();

        assert_eq!(verdict.verdict, CoverageVerdict::NotCovered);
        assert_eq!(verdict.match_result.test_id, None);
        assert_eq!(scripted.calls(), 0);
    }

    #[test]
    fn test_inactive_scenario_produces_nothing() {
        let matcher = guard(ScriptedMatcher::new().with_default(1.0));
        let resolver = CoverageResolver::new(&matcher);
        let test = unit_test("T1", CREATE, "creates customer", "A.java", 1);

        assert!(resolver
            .resolve(&inactive("S1", CREATE, "create customer"), &[&test])
            .is_none());
    }

    #[test]
    fn test_ties_prefer_earliest_line_then_id() {
        let matcher = guard(ScriptedMatcher::new().with_default(0.8));
        let resolver = CoverageResolver::new(&matcher);
        let late = unit_test("T-a", CREATE, "creates customer", "A.java", 40);
        let early_b = unit_test("T-c", CREATE, "creates customer again", "A.java", 10);
        let early_a = unit_test("T-b", CREATE, "creates customer once more", "B.java", 10);

        let verdict = resolver
            .resolve(
                &baseline("S1", CREATE, "create customer"),
                &[&late, &early_b, &early_a],
            )
            .unwrap();

        assert_eq!(verdict.match_result.test_id.as_deref(), Some("T-b"));
    }

    #[test]
    fn test_matcher_failure_is_flagged_not_covered() {
        let matcher = GuardedMatcher::new(
            Arc::new(FailingMatcher),
            RetryConfig {
                base_delay_ms: 1,
                ..Default::default()
            },
        );
        let resolver = CoverageResolver::new(&matcher);
        let test = unit_test("T1", CREATE, "creates customer", "A.java", 1);

        let verdict = resolver
            .resolve(&baseline("S1", CREATE, "create customer"), &[&test])
            .unwrap();

        assert_eq!(verdict.verdict, CoverageVerdict::NotCovered);
        assert!(verdict.match_result.matcher_unavailable);
        assert_eq!(matcher.backend_calls(), 2);
    }

    #[test]
    fn test_resolve_all_keeps_input_order_and_honors_cancellation() {
        let matcher = guard(ScriptedMatcher::new().with_default(0.9));
        let resolver = CoverageResolver::new(&matcher);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
        let scenarios: Vec<Scenario> = (0..20)
            .map(|i| baseline(&format!("S{i}"), CREATE, &format!("scenario {i}")))
            .collect();
        let refs: Vec<&Scenario> = scenarios.iter().collect();
        let test = unit_test("T1", CREATE, "creates customer", "A.java", 1);

        let verdicts = resolver
            .resolve_all(&refs, &[&test], &pool, &CancellationToken::new())
            .unwrap();
        let ids: Vec<&str> = verdicts.iter().map(|v| v.scenario_id.as_str()).collect();
        let expected: Vec<String> = (0..20).map(|i| format!("S{i}")).collect();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());

        let cancelled = CancellationToken::new();
        cancelled.cancel();
        assert!(matches!(
            resolver.resolve_all(&refs, &[&test], &pool, &cancelled),
            Err(crate::core::Error::Cancelled)
        ));
    }
}
