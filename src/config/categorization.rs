use serde::{Deserialize, Serialize};

/// Markers that identify infrastructure-level tests.
pub const DEFAULT_TECHNICAL_MARKERS: &[&str] = &["entity", "dto", "mapper", "repository"];

/// Markers that identify controller/service-level tests.
pub const DEFAULT_BUSINESS_MARKERS: &[&str] =
    &["controller", "service", "handler", "resource", "endpoint"];

/// Extra markers for orphan test categorization.
///
/// Configured markers extend the built-in tables; they never replace them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategorizationConfig {
    #[serde(default)]
    pub technical_markers: Vec<String>,

    #[serde(default)]
    pub business_markers: Vec<String>,
}

impl CategorizationConfig {
    pub fn effective_technical_markers(&self) -> Vec<String> {
        merge_markers(DEFAULT_TECHNICAL_MARKERS, &self.technical_markers)
    }

    pub fn effective_business_markers(&self) -> Vec<String> {
        merge_markers(DEFAULT_BUSINESS_MARKERS, &self.business_markers)
    }
}

fn merge_markers(defaults: &[&str], extra: &[String]) -> Vec<String> {
    let mut markers: Vec<String> = defaults.iter().map(|m| m.to_string()).collect();
    for marker in extra {
        let marker = marker.trim().to_lowercase();
        if !marker.is_empty() && !markers.contains(&marker) {
            markers.push(marker);
        }
    }
    markers
}
