//! Baseline-incomplete policies, matcher failures and run-level failures.

use gapmap::config::{BaselinePolicy, GapmapConfig, RetryConfig};
use gapmap::core::{
    ApiKey, CancellationToken, CoverageVerdict, Error, GapKind, ScopedEntity, TestCategory,
};
use gapmap::engine::{AnalysisEngine, AnalysisInput};
use gapmap::matching::SimilarityMatcher;
use gapmap::testkit::{
    api, baseline, suggested, unit_test, FailingMatcher, FlakyMatcher, InputBuilder,
    ScriptedMatcher, SlowMatcher,
};
use gapmap::{assert_contains_error, assert_result_ok};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

const API: &str = "POST /v1/orders";
const TEST_FILE: &str = "src/test/java/com/acme/order/OrderControllerTest.java";

/// One fully covered scenario plus one suggestion the baseline lacks.
fn incomplete_baseline() -> AnalysisInput {
    InputBuilder::new()
        .service("orders")
        .api(api("POST", "/v1/orders"))
        .scenario(baseline("S1", API, "Create order successfully"))
        .scenario(suggested("A1", API, "Reject order with invalid currency"))
        .test(unit_test("T1", API, "creates order", TEST_FILE, 10))
        .build()
}

fn scripted() -> ScriptedMatcher {
    ScriptedMatcher::new().with_score("Create order successfully", "creates order", 0.92)
}

fn engine_with(config: GapmapConfig, matcher: impl SimilarityMatcher + 'static) -> AnalysisEngine {
    AnalysisEngine::with_matcher(config, Arc::new(matcher))
}

fn fast_retry(max_retries: u32, timeout_ms: u64) -> RetryConfig {
    RetryConfig {
        max_retries,
        timeout_ms,
        base_delay_ms: 1,
    }
}

#[test]
fn test_flag_only_keeps_verdicts_and_flags_api() {
    let summary = assert_result_ok!(
        engine_with(GapmapConfig::default(), scripted()).run(&incomplete_baseline())
    );

    assert_eq!(
        summary.scenario_verdicts[0].verdict,
        CoverageVerdict::FullyCovered
    );
    assert_eq!(summary.coverage_percent, Some(100.0));
    let api_summary = summary.api_summary(&ApiKey::from(API)).unwrap();
    assert!(api_summary.baseline_incomplete);
    assert_eq!(summary.gaps_of_kind(GapKind::NotCoveredSuggested).count(), 1);
    assert_eq!(summary.gaps_of_kind(GapKind::Partial).count(), 0);
}

#[test]
fn test_downgrade_turns_full_into_partial() {
    let mut config = GapmapConfig::default();
    config.policy.baseline_incomplete = BaselinePolicy::Downgrade;

    let summary = assert_result_ok!(engine_with(config, scripted()).run(&incomplete_baseline()));

    let verdict = &summary.scenario_verdicts[0];
    assert_eq!(verdict.verdict, CoverageVerdict::PartiallyCovered);
    assert_eq!(verdict.match_result.test_id.as_deref(), Some("T1"));
    assert!(verdict.match_result.explanation.contains("downgraded"));
    assert_eq!(summary.coverage_percent, Some(0.0));
    assert_eq!(summary.gaps_of_kind(GapKind::Partial).count(), 1);
    // Claimed tests stay claimed after a downgrade
    assert!(summary.orphan_tests.is_empty());
}

#[test]
fn test_downgrade_leaves_complete_apis_alone() {
    let mut config = GapmapConfig::default();
    config.policy.baseline_incomplete = BaselinePolicy::Downgrade;
    let matcher = scripted().with_score(
        "Reject order with invalid currency",
        "Create order successfully",
        0.8,
    );

    let summary = assert_result_ok!(engine_with(config, matcher).run(&incomplete_baseline()));

    assert_eq!(
        summary.scenario_verdicts[0].verdict,
        CoverageVerdict::FullyCovered
    );
    assert!(summary.gaps.is_empty());
}

#[test]
fn test_unreachable_matcher_degrades_to_not_covered() {
    let config = GapmapConfig {
        retry: fast_retry(1, 1_000),
        ..Default::default()
    };

    let summary =
        assert_result_ok!(engine_with(config, FailingMatcher).run(&incomplete_baseline()));

    let verdict = &summary.scenario_verdicts[0];
    assert_eq!(verdict.verdict, CoverageVerdict::NotCovered);
    assert!(verdict.match_result.matcher_unavailable);
    assert_eq!(verdict.match_result.test_id, None);

    // Verdict, missing suggestion and unclaimed test all hit the matcher
    assert_eq!(summary.matcher_unavailable_count, 3);
    assert!(summary.gaps.iter().any(|g| g.matcher_unavailable));
    assert_eq!(summary.orphan_tests.len(), 1);
    assert_eq!(summary.orphan_tests[0].category, TestCategory::Business);
    assert!(summary.orphan_tests[0].needs_manual_authoring);
}

#[test]
fn test_single_transient_failure_is_retried() {
    let config = GapmapConfig {
        retry: fast_retry(1, 1_000),
        ..Default::default()
    };
    let input = InputBuilder::new()
        .api(api("POST", "/v1/orders"))
        .scenario(baseline("S1", API, "Create order successfully"))
        .test(unit_test("T1", API, "creates order", TEST_FILE, 10))
        .build();

    let engine = engine_with(config, FlakyMatcher::new(1, scripted()));
    let summary = assert_result_ok!(engine.run(&input));

    let verdict = &summary.scenario_verdicts[0];
    assert_eq!(verdict.verdict, CoverageVerdict::FullyCovered);
    assert!(!verdict.match_result.matcher_unavailable);
    assert_eq!(summary.matcher_unavailable_count, 0);
}

#[test]
fn test_second_failure_exhausts_retry() {
    let config = GapmapConfig {
        retry: fast_retry(1, 1_000),
        ..Default::default()
    };
    let input = InputBuilder::new()
        .api(api("POST", "/v1/orders"))
        .scenario(baseline("S1", API, "Create order successfully"))
        .test(unit_test("T1", API, "creates order", TEST_FILE, 10))
        .build();

    let engine = engine_with(config, FlakyMatcher::new(2, scripted()));
    let summary = assert_result_ok!(engine.run(&input));

    assert!(summary.scenario_verdicts[0].match_result.matcher_unavailable);
    assert_eq!(summary.counts.not_covered, 1);
}

#[test]
fn test_slow_matcher_times_out() {
    let config = GapmapConfig {
        retry: fast_retry(0, 20),
        ..Default::default()
    };
    let input = InputBuilder::new()
        .api(api("POST", "/v1/orders"))
        .scenario(baseline("S1", API, "Create order successfully"))
        .test(unit_test("T1", API, "creates order", TEST_FILE, 10))
        .build();

    let summary = assert_result_ok!(
        engine_with(config, SlowMatcher::new(Duration::from_millis(500))).run(&input)
    );

    let verdict = &summary.scenario_verdicts[0];
    assert_eq!(verdict.verdict, CoverageVerdict::NotCovered);
    assert!(verdict.match_result.matcher_unavailable);
}

#[test]
fn test_cancelled_run_returns_no_summary() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = engine_with(GapmapConfig::default(), scripted())
        .run_with_cancellation(&incomplete_baseline(), &cancel);

    assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn test_duplicate_scenario_id_fails_the_run() {
    let mut input = incomplete_baseline();
    input
        .scenarios
        .push(baseline("S1", API, "Create order twice"));

    let engine = engine_with(GapmapConfig::default(), scripted());
    assert_contains_error!(engine.run(&input), "duplicate scenario id");
}

#[test]
fn test_test_without_any_name_fails_the_run() {
    let mut input = incomplete_baseline();
    let mut nameless = unit_test("T2", API, "placeholder", TEST_FILE, 30);
    nameless.display_text.clear();
    nameless.raw_name.clear();
    input.tests.push(nameless);

    let result = engine_with(GapmapConfig::default(), scripted()).run(&input);
    assert!(matches!(result, Err(Error::InvalidInput { .. })));
}

#[test]
fn test_scope_mismatches_are_reported_and_excluded() {
    let mut input = incomplete_baseline();
    input
        .scenarios
        .push(baseline("S9", "DELETE /v1/orders/{id}", "Delete order with auth"));
    input
        .tests
        .push(unit_test("T9", "DELETE /v1/orders/{id}", "deletes order", TEST_FILE, 90));

    let summary = assert_result_ok!(engine_with(GapmapConfig::default(), scripted()).run(&input));

    let mismatched: Vec<(ScopedEntity, &str)> = summary
        .scope_mismatches
        .iter()
        .map(|m| (m.entity, m.id.as_str()))
        .collect();
    assert_eq!(
        mismatched,
        vec![(ScopedEntity::Scenario, "S9"), (ScopedEntity::Test, "T9")]
    );
    assert_eq!(summary.counts.active_scenarios, 1);
    assert!(summary.orphan_tests.iter().all(|o| o.test.id != "T9"));
    assert!(summary.gaps.iter().all(|g| g.subject_id.as_deref() != Some("S9")));
}
