//! Technical vs business categorization of orphan tests.

use crate::config::CategorizationConfig;
use crate::core::{Test, TestCategory};
use crate::matching::tokenize;

/// Decides whether an unclaimed test exercises infrastructure or behavior.
pub trait TestCategorizer: Send + Sync {
    fn categorize(&self, test: &Test) -> TestCategory;
}

/// Keyword rule table over file name, file path and raw method name.
///
/// Markers match whole words: names are split on separators and camelCase
/// boundaries first, so `entity` matches `OrderEntityTest` but not
/// `IdentityVerificationTest`.
///
/// 1. A business marker in the file name makes the test BUSINESS, so a
///    controller test that happens to build DTOs stays BUSINESS.
/// 2. Otherwise a technical marker anywhere in the path or raw name makes it
///    TECHNICAL.
/// 3. Anything else is BUSINESS.
#[derive(Debug, Clone)]
pub struct RuleTableCategorizer {
    technical_markers: Vec<Vec<String>>,
    business_markers: Vec<Vec<String>>,
}

impl Default for RuleTableCategorizer {
    fn default() -> Self {
        Self::from_config(&CategorizationConfig::default())
    }
}

impl RuleTableCategorizer {
    pub fn from_config(config: &CategorizationConfig) -> Self {
        Self {
            technical_markers: marker_words(config.effective_technical_markers()),
            business_markers: marker_words(config.effective_business_markers()),
        }
    }

    fn any_marker(markers: &[Vec<String>], words: &[String]) -> bool {
        markers.iter().any(|marker| {
            words
                .windows(marker.len())
                .any(|window| window == marker.as_slice())
        })
    }
}

/// Multi-word markers (`use_case`) match as a contiguous word run.
fn marker_words(markers: Vec<String>) -> Vec<Vec<String>> {
    markers
        .iter()
        .map(|marker| tokenize(marker))
        .filter(|words| !words.is_empty())
        .collect()
}

impl TestCategorizer for RuleTableCategorizer {
    fn categorize(&self, test: &Test) -> TestCategory {
        let file_name = test
            .file_path
            .file_name()
            .map(|name| tokenize(&name.to_string_lossy()))
            .unwrap_or_default();
        if Self::any_marker(&self.business_markers, &file_name) {
            return TestCategory::Business;
        }

        let path = tokenize(&test.file_path.to_string_lossy());
        let raw_name = tokenize(&test.raw_name);
        if Self::any_marker(&self.technical_markers, &path)
            || Self::any_marker(&self.technical_markers, &raw_name)
        {
            return TestCategory::Technical;
        }

        TestCategory::Business
    }
}
