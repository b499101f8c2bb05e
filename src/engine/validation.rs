//! Input validation and API scope partitioning.
//!
//! Validation is all-or-nothing: the first malformed entity fails the run.
//! Scope mismatches are not malformed input; they are split out, logged and
//! reported, and the rest of the run proceeds without them.

use super::AnalysisInput;
use crate::core::{ApiKey, Error, Result, Scenario, ScopeMismatch, ScopedEntity, Test};
use std::collections::HashSet;
use tracing::warn;

/// Reject the input if any entity is malformed or duplicated.
pub fn validate_input(input: &AnalysisInput) -> Result<()> {
    let mut api_keys = HashSet::new();
    for api in &input.apis {
        if api.method.trim().is_empty() || api.path.trim().is_empty() {
            return Err(Error::invalid_input(
                api.key.as_str(),
                "API needs both a method and a path",
            ));
        }
        if !api.key_is_consistent() {
            return Err(Error::invalid_input(
                api.key.as_str(),
                format!(
                    "API key '{}' does not match {} {}",
                    api.key,
                    api.method,
                    api.path
                ),
            ));
        }
        if !api_keys.insert(&api.key) {
            return Err(Error::invalid_input(api.key.as_str(), "duplicate API key"));
        }
    }

    let mut scenario_ids = HashSet::new();
    for scenario in &input.scenarios {
        if scenario.id.trim().is_empty() {
            return Err(Error::invalid_input("scenario", "scenario id must not be empty"));
        }
        if !scenario_ids.insert(scenario.id.as_str()) {
            return Err(Error::invalid_input(&scenario.id, "duplicate scenario id"));
        }
        if scenario.active && scenario.text.trim().is_empty() {
            return Err(Error::invalid_input(
                &scenario.id,
                "active scenario has no text",
            ));
        }
    }

    let mut test_ids = HashSet::new();
    for test in &input.tests {
        if test.id.trim().is_empty() {
            return Err(Error::invalid_input("test", "test id must not be empty"));
        }
        if !test_ids.insert(test.id.as_str()) {
            return Err(Error::invalid_input(&test.id, "duplicate test id"));
        }
        if test.description().trim().is_empty() {
            return Err(Error::invalid_input(
                &test.id,
                "test has neither display text nor raw name",
            ));
        }
    }

    Ok(())
}

/// Entities whose API key is known, plus everything that was split out.
#[derive(Debug, Default)]
pub struct ScopedInput<'a> {
    pub scenarios: Vec<&'a Scenario>,
    pub tests: Vec<&'a Test>,
    pub mismatches: Vec<ScopeMismatch>,
}

impl ScopedInput<'_> {
    pub fn baseline(&self) -> Vec<&Scenario> {
        self.scenarios
            .iter()
            .copied()
            .filter(|s| s.is_baseline())
            .collect()
    }
}

pub fn partition_scope(input: &AnalysisInput) -> ScopedInput<'_> {
    let known: HashSet<&ApiKey> = input.apis.iter().map(|api| &api.key).collect();
    let mut scoped = ScopedInput::default();

    for scenario in &input.scenarios {
        if known.contains(&scenario.api_key) {
            scoped.scenarios.push(scenario);
        } else {
            warn!(
                scenario = %scenario.id,
                api = %scenario.api_key,
                "Scenario scoped to unknown API, excluded"
            );
            scoped.mismatches.push(ScopeMismatch {
                entity: ScopedEntity::Scenario,
                id: scenario.id.clone(),
                api_key: scenario.api_key.clone(),
            });
        }
    }

    for test in &input.tests {
        if known.contains(&test.api_key) {
            scoped.tests.push(test);
        } else {
            warn!(test = %test.id, api = %test.api_key, "Test scoped to unknown API, excluded");
            scoped.mismatches.push(ScopeMismatch {
                entity: ScopedEntity::Test,
                id: test.id.clone(),
                api_key: test.api_key.clone(),
            });
        }
    }

    scoped
}
