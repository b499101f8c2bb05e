//! Three-layer baseline completeness analysis.
//!
//! - **Layer A** (forward): suggested scenarios with no baseline counterpart
//!   scoring at least [`FULL_COVERAGE_THRESHOLD`].
//! - **Layer B** (reverse): tests no match result claims, each paired with the
//!   closest suggested scenario of its API when one scores at least
//!   [`PARTIAL_COVERAGE_THRESHOLD`].
//! - **Layer C** (adjustment): marks APIs whose baseline is incomplete and,
//!   only under [`BaselinePolicy::Downgrade`], downgrades their
//!   FULLY_COVERED verdicts.
//!
//! Layer A gaps are a baseline-completeness signal; they never enter the
//! scenario coverage percentage.

use crate::config::BaselinePolicy;
use crate::core::{
    ApiKey, CancellationToken, CoverageVerdict, Priority, Result, Scenario, ScenarioId,
    ScenarioVerdict, Test,
};
use crate::coverage::{claims_test, FULL_COVERAGE_THRESHOLD, PARTIAL_COVERAGE_THRESHOLD};
use crate::matching::{GuardedMatcher, MatchOutcome};
use crate::observability::set_current_api;
use crate::priority::scenario_priority;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

/// A suggested scenario the baseline does not contain.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingScenario {
    pub scenario_id: ScenarioId,
    pub api_key: ApiKey,
    pub text: String,
    pub priority: Priority,
    /// Best baseline score seen, if the comparison ran.
    pub closest_score: Option<f64>,
    /// The comparison could not run; reported as missing conservatively.
    pub matcher_unavailable: bool,
}

/// A test that no scenario claims, before categorization.
#[derive(Debug, Clone, PartialEq)]
pub struct UnclaimedTest {
    pub test: Test,
    pub suggested_scenario_text: Option<String>,
    pub matcher_unavailable: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletenessReport {
    pub missing: Vec<MissingScenario>,
    pub unclaimed: Vec<UnclaimedTest>,
    /// APIs with at least one missing suggested scenario.
    pub incomplete_apis: BTreeSet<ApiKey>,
    /// Verdicts changed by the downgrade policy.
    pub downgraded: usize,
}

pub struct CompletenessAnalyzer<'a> {
    matcher: &'a GuardedMatcher,
    policy: BaselinePolicy,
}

impl<'a> CompletenessAnalyzer<'a> {
    pub fn new(matcher: &'a GuardedMatcher, policy: BaselinePolicy) -> Self {
        Self { matcher, policy }
    }

    /// Run all three layers. `verdicts` is adjusted in place by layer C.
    pub fn analyze(
        &self,
        scenarios: &[&Scenario],
        tests: &[&Test],
        verdicts: &mut [ScenarioVerdict],
        pool: &rayon::ThreadPool,
        cancel: &CancellationToken,
    ) -> Result<CompletenessReport> {
        let missing = self.forward_check(scenarios, pool, cancel)?;
        let unclaimed = self.reverse_check(scenarios, tests, verdicts, pool, cancel)?;

        let incomplete_apis: BTreeSet<ApiKey> =
            missing.iter().map(|m| m.api_key.clone()).collect();
        let downgraded = apply_policy(self.policy, verdicts, &incomplete_apis);

        Ok(CompletenessReport {
            missing,
            unclaimed,
            incomplete_apis,
            downgraded,
        })
    }

    /// Layer A: suggested scenarios absent from the baseline of their API.
    pub fn forward_check(
        &self,
        scenarios: &[&Scenario],
        pool: &rayon::ThreadPool,
        cancel: &CancellationToken,
    ) -> Result<Vec<MissingScenario>> {
        let baseline_texts = active_texts_by_api(scenarios, Scenario::is_baseline);
        let no_baseline: Vec<String> = Vec::new();
        let suggestions: Vec<&Scenario> = scenarios
            .iter()
            .copied()
            .filter(|s| s.active && s.is_suggested())
            .collect();

        let checked: Vec<Option<MissingScenario>> = pool.install(|| {
            suggestions
                .par_iter()
                .map(|suggestion| {
                    cancel.check()?;
                    let _api = set_current_api(&suggestion.api_key);
                    let baseline = baseline_texts
                        .get(&suggestion.api_key)
                        .unwrap_or(&no_baseline);
                    Ok(self.check_suggestion(suggestion, baseline))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        Ok(checked.into_iter().flatten().collect())
    }

    fn check_suggestion(
        &self,
        suggestion: &Scenario,
        baseline: &[String],
    ) -> Option<MissingScenario> {
        let outcome = self.matcher.compare(&suggestion.text, baseline);
        let (closest_score, matcher_unavailable) = match outcome {
            MatchOutcome::Ranked(scores) => (scores.first().map(|s| s.score), false),
            MatchOutcome::Unavailable { .. } => {
                warn!(
                    scenario = %suggestion.id,
                    "Matcher unavailable, treating suggested scenario as missing"
                );
                (None, true)
            }
        };

        if closest_score.is_some_and(|score| score >= FULL_COVERAGE_THRESHOLD) {
            return None;
        }

        debug!(
            scenario = %suggestion.id,
            api = %suggestion.api_key,
            "Suggested scenario missing from baseline"
        );
        Some(MissingScenario {
            scenario_id: suggestion.id.clone(),
            api_key: suggestion.api_key.clone(),
            text: suggestion.text.clone(),
            priority: scenario_priority(suggestion),
            closest_score,
            matcher_unavailable,
        })
    }

    /// Layer B: tests not claimed by any verdict, with a suggested scenario
    /// text where one of the API's suggestions is close enough.
    pub fn reverse_check(
        &self,
        scenarios: &[&Scenario],
        tests: &[&Test],
        verdicts: &[ScenarioVerdict],
        pool: &rayon::ThreadPool,
        cancel: &CancellationToken,
    ) -> Result<Vec<UnclaimedTest>> {
        let claimed: HashSet<&str> = verdicts
            .iter()
            .filter(|v| claims_test(v.match_result.score))
            .filter_map(|v| v.match_result.test_id.as_deref())
            .collect();
        let suggestion_texts = active_texts_by_api(scenarios, Scenario::is_suggested);
        let no_suggestions: Vec<String> = Vec::new();

        let orphans: Vec<&Test> = tests
            .iter()
            .copied()
            .filter(|test| !claimed.contains(test.id.as_str()))
            .collect();

        pool.install(|| {
            orphans
                .par_iter()
                .map(|test| {
                    cancel.check()?;
                    let _api = set_current_api(&test.api_key);
                    let suggestions = suggestion_texts
                        .get(&test.api_key)
                        .unwrap_or(&no_suggestions);
                    Ok(self.suggest_for(test, suggestions))
                })
                .collect::<Result<Vec<_>>>()
        })
    }

    fn suggest_for(&self, test: &Test, suggestions: &[String]) -> UnclaimedTest {
        let (suggested_scenario_text, matcher_unavailable) =
            match self.matcher.compare(test.description(), suggestions) {
                MatchOutcome::Ranked(scores) => (
                    scores
                        .first()
                        .filter(|best| best.score >= PARTIAL_COVERAGE_THRESHOLD)
                        .map(|best| suggestions[best.index].clone()),
                    false,
                ),
                MatchOutcome::Unavailable { .. } => (None, true),
            };

        UnclaimedTest {
            test: test.clone(),
            suggested_scenario_text,
            matcher_unavailable,
        }
    }
}

/// Layer C. Returns how many verdicts were downgraded.
pub fn apply_policy(
    policy: BaselinePolicy,
    verdicts: &mut [ScenarioVerdict],
    incomplete_apis: &BTreeSet<ApiKey>,
) -> usize {
    if policy == BaselinePolicy::FlagOnly {
        return 0;
    }

    let mut downgraded = 0;
    for verdict in verdicts
        .iter_mut()
        .filter(|v| v.verdict == CoverageVerdict::FullyCovered)
        .filter(|v| incomplete_apis.contains(&v.api_key))
    {
        verdict.verdict = CoverageVerdict::PartiallyCovered;
        verdict
            .match_result
            .explanation
            .push_str("; downgraded: baseline scenario set for this API is incomplete");
        downgraded += 1;
    }
    downgraded
}

fn active_texts_by_api(
    scenarios: &[&Scenario],
    include: impl Fn(&Scenario) -> bool,
) -> BTreeMap<ApiKey, Vec<String>> {
    let mut texts: BTreeMap<ApiKey, Vec<String>> = BTreeMap::new();
    for scenario in scenarios.iter().filter(|s| s.active && include(s)) {
        texts
            .entry(scenario.api_key.clone())
            .or_default()
            .push(scenario.text.clone());
    }
    texts
}
