//! Run orchestration.
//!
//! One call to [`AnalysisEngine::run`] is one reconciliation run:
//!
//! 1. validate every entity and split out scope mismatches
//! 2. resolve coverage for active baseline scenarios (parallel)
//! 3. completeness layers A, B and C (parallel where per-item)
//! 4. aggregate orphans, gaps and metrics (sequential)
//!
//! The run either returns a complete [`ServiceSummary`] or an error; nothing
//! partial is ever handed back. All per-run state, including the matcher
//! cache and the worker pool, is built inside the run and dropped with it.

pub mod validation;

pub use validation::{partition_scope, validate_input, ScopedInput};

use crate::aggregation::{
    AggregationInput, OrphanAndGapAggregator, RuleTableCategorizer, TestCategorizer,
};
use crate::completeness::CompletenessAnalyzer;
use crate::config::GapmapConfig;
use crate::core::{Api, CancellationToken, Error, Result, Scenario, ServiceSummary, Test};
use crate::coverage::CoverageResolver;
use crate::matching::{build_matcher, GuardedMatcher, SimilarityMatcher};
use crate::observability::{set_phase, set_service, AnalysisPhase};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, info_span};

/// Entities handed over by the discovery and loading collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default)]
    pub apis: Vec<Api>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub tests: Vec<Test>,
}

pub struct AnalysisEngine {
    config: GapmapConfig,
    matcher: Arc<dyn SimilarityMatcher>,
    categorizer: Arc<dyn TestCategorizer>,
}

impl AnalysisEngine {
    /// Build an engine with the matcher backend selected by `config`.
    pub fn new(config: GapmapConfig) -> Result<Self> {
        config.validate().map_err(Error::Configuration)?;
        let matcher = build_matcher(&config.matcher, &config.retry)?;
        Ok(Self::with_matcher(config, matcher))
    }

    /// Build an engine around an explicit matcher.
    pub fn with_matcher(config: GapmapConfig, matcher: Arc<dyn SimilarityMatcher>) -> Self {
        let categorizer = Arc::new(RuleTableCategorizer::from_config(&config.categorization));
        Self {
            config,
            matcher,
            categorizer,
        }
    }

    /// Replace the rule-table categorizer with another implementation.
    pub fn with_categorizer(mut self, categorizer: Arc<dyn TestCategorizer>) -> Self {
        self.categorizer = categorizer;
        self
    }

    pub fn config(&self) -> &GapmapConfig {
        &self.config
    }

    pub fn run(&self, input: &AnalysisInput) -> Result<ServiceSummary> {
        self.run_with_cancellation(input, &CancellationToken::new())
    }

    /// Run, checking `cancel` between scenarios and between stages.
    pub fn run_with_cancellation(
        &self,
        input: &AnalysisInput,
        cancel: &CancellationToken,
    ) -> Result<ServiceSummary> {
        let span = info_span!(
            "analysis_run",
            service = input.service.as_deref().unwrap_or("-"),
            matcher = self.matcher.name()
        );
        let _enter = span.enter();
        let _service = set_service(input.service.as_deref());

        let scoped = {
            let _phase = set_phase(AnalysisPhase::Validation);
            validate_input(input)?;
            partition_scope(input)
        };
        cancel.check()?;

        info!(
            apis = input.apis.len(),
            scenarios = scoped.scenarios.len(),
            tests = scoped.tests.len(),
            scope_mismatches = scoped.mismatches.len(),
            "Starting reconciliation"
        );

        let pool = self.build_pool()?;
        let matcher = GuardedMatcher::new(self.matcher.clone(), self.config.retry.clone());

        let mut verdicts = {
            let _phase = set_phase(AnalysisPhase::CoverageResolution);
            CoverageResolver::new(&matcher).resolve_all(
                &scoped.baseline(),
                &scoped.tests,
                &pool,
                cancel,
            )?
        };
        cancel.check()?;

        let completeness = {
            let _phase = set_phase(AnalysisPhase::CompletenessAnalysis);
            CompletenessAnalyzer::new(&matcher, self.config.policy.baseline_incomplete).analyze(
                &scoped.scenarios,
                &scoped.tests,
                &mut verdicts,
                &pool,
                cancel,
            )?
        };
        cancel.check()?;

        debug!(
            missing = completeness.missing.len(),
            unclaimed = completeness.unclaimed.len(),
            downgraded = completeness.downgraded,
            backend_calls = matcher.backend_calls(),
            "Completeness analysis finished"
        );

        let summary = {
            let _phase = set_phase(AnalysisPhase::Aggregation);
            OrphanAndGapAggregator::new(self.categorizer.as_ref()).aggregate(AggregationInput {
                service: input.service.clone(),
                apis: &input.apis,
                scenarios: &scoped.scenarios,
                tests: &scoped.tests,
                verdicts,
                completeness,
                scope_mismatches: scoped.mismatches,
            })
        };

        info!(
            coverage_percent = ?summary.coverage_percent,
            gaps = summary.gaps.len(),
            orphan_tests = summary.orphan_tests.len(),
            orphan_apis = summary.orphan_apis.len(),
            matcher_unavailable = summary.matcher_unavailable_count,
            "Reconciliation complete"
        );

        Ok(summary)
    }

    fn build_pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.parallel.effective_concurrency())
            .thread_name(|index| format!("gapmap-worker-{index}"))
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build worker pool: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CoverageVerdict, GapKind, Priority, Test, TestCategory};
    use crate::testkit::{api, baseline, suggested, unit_test, InputBuilder, ScriptedMatcher};

    fn engine(matcher: ScriptedMatcher) -> AnalysisEngine {
        AnalysisEngine::with_matcher(GapmapConfig::default(), Arc::new(matcher))
    }

    struct EverythingTechnical;

    impl TestCategorizer for EverythingTechnical {
        fn categorize(&self, _test: &Test) -> TestCategory {
            TestCategory::Technical
        }
    }

    #[test]
    fn test_suggested_scenarios_get_no_verdict() {
        let input = InputBuilder::new()
            .api(api("GET", "/a"))
            .scenario(baseline("S1", "GET /a", "list things"))
            .scenario(suggested("A1", "GET /a", "list things"))
            .build();

        let summary = engine(ScriptedMatcher::new().with_default(0.95))
            .run(&input)
            .unwrap();

        assert_eq!(summary.scenario_verdicts.len(), 1);
        assert_eq!(summary.scenario_verdicts[0].scenario_id, "S1");
        assert!(summary.gaps_of_kind(GapKind::NotCoveredSuggested).next().is_none());
    }

    #[test]
    fn test_invalid_input_returns_no_summary() {
        let input = InputBuilder::new()
            .api(api("GET", "/a"))
            .scenario(baseline("S1", "GET /a", "one"))
            .scenario(baseline("S1", "GET /a", "two"))
            .build();

        assert!(matches!(
            engine(ScriptedMatcher::new()).run(&input),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_cancelled_run_fails() {
        let input = InputBuilder::new()
            .api(api("GET", "/a"))
            .scenario(baseline("S1", "GET /a", "one"))
            .build();
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(matches!(
            engine(ScriptedMatcher::new()).run_with_cancellation(&input, &cancel),
            Err(Error::Cancelled)
        ));
    }

    #[test]
    fn test_scope_mismatch_is_reported_not_counted() {
        let input = InputBuilder::new()
            .api(api("GET", "/a"))
            .scenario(baseline("S1", "GET /a", "list things"))
            .scenario(baseline("S2", "GET /elsewhere", "security check"))
            .test(unit_test("T1", "GET /a", "lists things", "ThingControllerTest.java", 1))
            .build();

        let summary = engine(ScriptedMatcher::new().with_default(0.8))
            .run(&input)
            .unwrap();

        assert_eq!(summary.counts.active_scenarios, 1);
        assert_eq!(summary.scope_mismatches.len(), 1);
        assert_eq!(summary.coverage_percent, Some(100.0));
        assert!(summary.gaps.is_empty());
        assert_eq!(summary.priority_histogram.get(Priority::P0), 0);
        assert_eq!(summary.scenario_verdicts[0].verdict, CoverageVerdict::FullyCovered);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = GapmapConfig::default();
        config.parallel.max_concurrency = Some(0);

        assert!(matches!(
            AnalysisEngine::new(config),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_custom_categorizer_decides_orphan_category() {
        let input = InputBuilder::new()
            .api(api("GET", "/a"))
            .scenario(baseline("S1", "GET /a", "list things"))
            .test(unit_test("T1", "GET /a", "rejects invalid token", "ThingControllerTest.java", 7))
            .build();

        let default_run = engine(ScriptedMatcher::new()).run(&input).unwrap();
        assert_eq!(default_run.orphan_tests[0].category, TestCategory::Business);
        assert_eq!(default_run.gaps_of_kind(GapKind::OrphanUnitTest).count(), 1);

        let custom_run = engine(ScriptedMatcher::new())
            .with_categorizer(Arc::new(EverythingTechnical))
            .run(&input)
            .unwrap();
        let orphan = &custom_run.orphan_tests[0];
        assert_eq!(orphan.test.id, "T1");
        assert_eq!(orphan.category, TestCategory::Technical);
        assert_eq!(orphan.priority, Priority::P3);
        assert_eq!(custom_run.gaps_of_kind(GapKind::OrphanUnitTest).count(), 0);
    }
}
