//! Orphan API detection and orphan test classification.

use super::categorizer::TestCategorizer;
use crate::completeness::UnclaimedTest;
use crate::core::{Api, ApiKey, OrphanApi, OrphanTest, Priority, Scenario, Test, TestCategory};
use crate::priority::{classify, scenario_priority};
use std::collections::HashSet;

/// Priority of an orphan API with no suggested scenario to borrow from.
pub const ORPHAN_API_DEFAULT_PRIORITY: Priority = Priority::P1;

/// APIs with zero active baseline scenarios and zero scoped tests, in input
/// order.
///
/// An orphan's priority is the most urgent among its active suggested
/// scenarios, or [`ORPHAN_API_DEFAULT_PRIORITY`] when it has none.
pub fn detect_orphan_apis(
    apis: &[Api],
    scenarios: &[&Scenario],
    tests: &[&Test],
) -> Vec<OrphanApi> {
    let with_baseline: HashSet<&ApiKey> = scenarios
        .iter()
        .filter(|s| s.active && s.is_baseline())
        .map(|s| &s.api_key)
        .collect();
    let with_tests: HashSet<&ApiKey> = tests.iter().map(|t| &t.api_key).collect();

    apis.iter()
        .filter(|api| !with_baseline.contains(&api.key) && !with_tests.contains(&api.key))
        .map(|api| {
            let suggestions: Vec<&Scenario> = scenarios
                .iter()
                .copied()
                .filter(|s| s.active && s.is_suggested() && s.api_key == api.key)
                .collect();
            let priority = suggestions
                .iter()
                .map(|s| scenario_priority(s))
                .min()
                .unwrap_or(ORPHAN_API_DEFAULT_PRIORITY);

            OrphanApi {
                api: api.clone(),
                priority,
                suggested_scenarios: suggestions.len(),
            }
        })
        .collect()
}

/// Categorize unclaimed tests. TECHNICAL orphans are pinned to P3; BUSINESS
/// orphans take the priority of their description.
pub fn classify_orphan_tests(
    unclaimed: Vec<UnclaimedTest>,
    categorizer: &dyn TestCategorizer,
) -> Vec<OrphanTest> {
    unclaimed
        .into_iter()
        .map(|entry| {
            let category = categorizer.categorize(&entry.test);
            let priority = match category {
                TestCategory::Technical => Priority::P3,
                TestCategory::Business => classify(entry.test.description()),
            };
            let needs_manual_authoring = entry.suggested_scenario_text.is_none();

            OrphanTest {
                test: entry.test,
                category,
                priority,
                suggested_scenario_text: entry.suggested_scenario_text,
                needs_manual_authoring,
            }
        })
        .collect()
}
