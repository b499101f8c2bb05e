//! Keyword-driven priority classification.
//!
//! Priority is assigned by an ordered rule cascade over case-insensitive
//! substrings. The first rule with a matching keyword wins, so a text that
//! mentions both authentication and invalid input is P0, never P1.

use crate::core::{Priority, Scenario};

/// Ordered rule cascade. Changing it is a deployment, not a runtime setting.
static PRIORITY_RULES: &[(Priority, &[&str])] = &[
    (
        Priority::P0,
        &["critical", "security", "auth", "injection", "xss"],
    ),
    (Priority::P1, &["error", "invalid", "fail"]),
    (Priority::P2, &["edge", "boundary"]),
];

/// Priority for texts matching no rule.
pub const DEFAULT_PRIORITY: Priority = Priority::P3;

/// Classify a scenario or test description.
///
/// Total and deterministic: every input maps to exactly one tier.
pub fn classify(text: &str) -> Priority {
    let lowered = text.to_lowercase();

    PRIORITY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(priority, _)| *priority)
        .unwrap_or(DEFAULT_PRIORITY)
}

/// Loader-supplied priority if present, otherwise classified from the text.
pub fn scenario_priority(scenario: &Scenario) -> Priority {
    scenario
        .priority
        .unwrap_or_else(|| classify(&scenario.text))
}
