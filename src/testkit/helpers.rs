//! Factory functions for analysis inputs.
//!
//! ```rust
//! use gapmap::testkit::helpers::{api, baseline, unit_test, InputBuilder};
//!
//! let input = InputBuilder::new()
//!     .api(api("POST", "/v1/customers"))
//!     .scenario(baseline("S1", "POST /v1/customers", "Create customer"))
//!     .test(unit_test("T1", "POST /v1/customers", "Create customer", "CustomerTest.java", 10))
//!     .build();
//! assert_eq!(input.scenarios.len(), 1);
//! ```

use crate::core::{Api, ApiKey, CategoryTag, Priority, Scenario, ScenarioSource, Test};
use crate::engine::AnalysisInput;

pub fn api(method: &str, path: &str) -> Api {
    Api::new(method, path)
}

pub fn baseline(id: &str, api_key: &str, text: &str) -> Scenario {
    scenario(id, api_key, text, ScenarioSource::Baseline)
}

pub fn suggested(id: &str, api_key: &str, text: &str) -> Scenario {
    scenario(id, api_key, text, ScenarioSource::AiSuggested)
}

/// A baseline scenario that was authored but disabled.
pub fn inactive(id: &str, api_key: &str, text: &str) -> Scenario {
    Scenario {
        active: false,
        ..baseline(id, api_key, text)
    }
}

pub fn with_priority(mut scenario: Scenario, priority: Priority) -> Scenario {
    scenario.priority = Some(priority);
    scenario
}

fn scenario(id: &str, api_key: &str, text: &str, source: ScenarioSource) -> Scenario {
    Scenario {
        id: id.to_string(),
        api_key: ApiKey::from(api_key),
        category: CategoryTag::Uncategorized,
        text: text.to_string(),
        priority: None,
        source,
        active: true,
    }
}

/// A unit test whose raw name is the display text without spaces.
pub fn unit_test(id: &str, api_key: &str, display_text: &str, file: &str, line: usize) -> Test {
    Test {
        id: id.to_string(),
        display_text: display_text.to_string(),
        raw_name: display_text.split_whitespace().collect::<Vec<_>>().join("_"),
        file_path: file.into(),
        line_number: line,
        api_key: ApiKey::from(api_key),
    }
}

/// Fluent builder for [`AnalysisInput`].
#[derive(Debug, Default)]
pub struct InputBuilder {
    input: AnalysisInput,
}

impl InputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(mut self, name: &str) -> Self {
        self.input.service = Some(name.to_string());
        self
    }

    pub fn api(mut self, api: Api) -> Self {
        self.input.apis.push(api);
        self
    }

    pub fn scenario(mut self, scenario: Scenario) -> Self {
        self.input.scenarios.push(scenario);
        self
    }

    pub fn test(mut self, test: Test) -> Self {
        self.input.tests.push(test);
        self
    }

    pub fn build(self) -> AnalysisInput {
        self.input
    }
}
