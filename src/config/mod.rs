//! Configuration loaded from `.gapmap.toml`.
//!
//! ```toml
//! [matcher]
//! backend = "heuristic"
//!
//! [retry]
//! timeout_ms = 10000
//! max_retries = 1
//!
//! [parallel]
//! max_concurrency = 4
//!
//! [policy]
//! baseline_incomplete = "flag_only"
//!
//! [categorization]
//! technical_markers = ["util"]
//! ```

mod categorization;
mod core;
mod loader;
mod parallel;
pub mod retry;

pub use categorization::{CategorizationConfig, DEFAULT_BUSINESS_MARKERS, DEFAULT_TECHNICAL_MARKERS};
pub use core::{BaselinePolicy, GapmapConfig, MatcherBackend, MatcherConfig, PolicyConfig};
pub use loader::{
    directory_ancestors, load_config, load_config_from, load_config_from_path,
    parse_and_validate_config, CONFIG_FILE_NAME,
};
pub use parallel::ParallelConfig;
pub use retry::{RetryConfig, MAX_RETRIES};

/// Default config file written by `gapmap init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# gapmap configuration

[matcher]
# "heuristic" (local, deterministic) or "hosted"
backend = "heuristic"
# endpoint = "https://matcher.example.com/v1/compare"
# api_key_env = "GAPMAP_MATCHER_API_KEY"

[retry]
timeout_ms = 10000
max_retries = 1
base_delay_ms = 50

[parallel]
enabled = true
# max_concurrency = 4

[policy]
# "flag_only" or "downgrade"
baseline_incomplete = "flag_only"

[categorization]
technical_markers = []
business_markers = []
"#;
