//! Entity definitions: the inputs handed over by discovery/loading and the
//! per-run classifications derived from them.

use super::Priority;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub type ScenarioId = String;
pub type TestId = String;

/// Scope key of an API endpoint: `METHOD /normalized/path`.
///
/// Keys are normalized on construction (including deserialization), so two
/// spellings of the same endpoint compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ApiKey(String);

impl ApiKey {
    /// Build a key from a method and a raw path.
    pub fn from_parts(method: &str, path: &str) -> Self {
        Self(format!(
            "{} {}",
            method.trim().to_ascii_uppercase(),
            normalize_path(path)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ApiKey {
    fn from(raw: String) -> Self {
        match raw.trim().split_once(char::is_whitespace) {
            Some((method, path)) => Self::from_parts(method, path),
            None => Self(raw.trim().to_string()),
        }
    }
}

impl From<&str> for ApiKey {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<ApiKey> for String {
    fn from(key: ApiKey) -> Self {
        key.0
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize an endpoint path: leading slash, no empty segments, no trailing
/// slash, and `:param` segments rewritten as `{param}`.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<String> = path
        .trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) if !name.is_empty() => format!("{{{name}}}"),
            _ => segment.to_string(),
        })
        .collect();

    format!("/{}", segments.join("/"))
}

/// An API endpoint supplied by API discovery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Api {
    pub key: ApiKey,
    pub method: String,
    pub path: String,
}

impl Api {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            key: ApiKey::from_parts(method, path),
            method: method.trim().to_ascii_uppercase(),
            path: normalize_path(path),
        }
    }

    /// True when the declared key agrees with `method` + normalized `path`.
    pub fn key_is_consistent(&self) -> bool {
        self.key == ApiKey::from_parts(&self.method, &self.path)
    }
}

/// Scenario category as authored by QA or suggested from the API surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryTag {
    HappyCase,
    ErrorCase,
    EdgeCase,
    Security,
    #[default]
    Uncategorized,
}

/// Where a scenario came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioSource {
    Baseline,
    AiSuggested,
}

fn default_active() -> bool {
    true
}

/// A declared behavioral requirement for one API.
///
/// `active = false` marks a scenario that was authored but disabled; it is
/// kept for audit and excluded from every count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub api_key: ApiKey,
    #[serde(default)]
    pub category: CategoryTag,
    pub text: String,
    /// Explicit priority from the loader; derived from `text` when absent.
    #[serde(default)]
    pub priority: Option<Priority>,
    pub source: ScenarioSource,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Scenario {
    pub fn is_baseline(&self) -> bool {
        self.source == ScenarioSource::Baseline
    }

    pub fn is_suggested(&self) -> bool {
        self.source == ScenarioSource::AiSuggested
    }
}

/// A unit test method as reported by test discovery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    pub id: TestId,
    pub display_text: String,
    pub raw_name: String,
    pub file_path: PathBuf,
    pub line_number: usize,
    pub api_key: ApiKey,
}

impl Test {
    /// Text compared against scenarios: the display text, or the raw method
    /// name when discovery produced no display text.
    pub fn description(&self) -> &str {
        if self.display_text.trim().is_empty() {
            &self.raw_name
        } else {
            &self.display_text
        }
    }
}

/// Confidence band for a similarity score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
    None,
}

/// Per-scenario coverage verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageVerdict {
    FullyCovered,
    PartiallyCovered,
    NotCovered,
}

impl std::fmt::Display for CoverageVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CoverageVerdict::FullyCovered => "FULLY_COVERED",
            CoverageVerdict::PartiallyCovered => "PARTIALLY_COVERED",
            CoverageVerdict::NotCovered => "NOT_COVERED",
        };
        f.write_str(s)
    }
}

/// Outcome of matching one scenario against its API's tests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub scenario_id: ScenarioId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<TestId>,
    pub confidence: Confidence,
    pub score: f64,
    pub explanation: String,
    /// The matcher could not evaluate this scenario; the verdict is a
    /// conservative NOT_COVERED rather than a confirmed one.
    #[serde(default)]
    pub matcher_unavailable: bool,
}

/// Verdict attached to one active baseline scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioVerdict {
    pub scenario_id: ScenarioId,
    pub api_key: ApiKey,
    pub text: String,
    pub category: CategoryTag,
    pub priority: Priority,
    pub verdict: CoverageVerdict,
    pub match_result: MatchResult,
}

/// Category of a test that no scenario claims.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestCategory {
    Technical,
    Business,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrphanTest {
    pub test: Test,
    pub category: TestCategory,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_scenario_text: Option<String>,
    /// No suggested scenario was found; QA has to author one by hand.
    pub needs_manual_authoring: bool,
}

/// An API with neither active baseline scenarios nor tests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrphanApi {
    pub api: Api,
    pub priority: Priority,
    /// Active AI-suggested scenarios that describe what the API should do.
    pub suggested_scenarios: usize,
}
