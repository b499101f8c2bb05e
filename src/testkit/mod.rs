//! Testing infrastructure for gapmap.
//!
//! - **Builders**: factory functions for APIs, scenarios, tests and whole inputs
//! - **Matchers**: deterministic [`SimilarityMatcher`](crate::matching::SimilarityMatcher)
//!   doubles, so engine behavior is testable without any network dependency
//! - **Assertion macros**: `Result` assertions exported at the crate root
//!
//! # Quick Start
//!
//! ```rust
//! use gapmap::engine::AnalysisEngine;
//! use gapmap::testkit::{api, baseline, InputBuilder, ScriptedMatcher};
//! use std::sync::Arc;
//!
//! let input = InputBuilder::new()
//!     .api(api("GET", "/v1/customers"))
//!     .scenario(baseline("S1", "GET /v1/customers", "List customers"))
//!     .build();
//!
//! let engine = AnalysisEngine::with_matcher(Default::default(), Arc::new(ScriptedMatcher::new()));
//! let summary = engine.run(&input).unwrap();
//! assert_eq!(summary.coverage_percent, Some(0.0));
//! ```

pub mod assertions;
pub mod helpers;
pub mod matchers;

pub use helpers::{
    api, baseline, inactive, suggested, unit_test, with_priority, InputBuilder,
};
pub use matchers::{FailingMatcher, FlakyMatcher, ScriptedMatcher, SlowMatcher};
