// Export modules for library usage
pub mod aggregation;
pub mod cli;
pub mod commands;
pub mod completeness;
pub mod config;
pub mod core;
pub mod coverage;
pub mod engine;
pub mod io;
pub mod matching;
pub mod observability;
pub mod priority;
pub mod testkit;

// Re-export commonly used types
pub use crate::core::{
    Api, ApiKey, CancellationToken, Confidence, CoverageVerdict, Error, Gap, GapKind,
    MatchResult, OrphanApi, OrphanTest, Priority, Result, Scenario, ScenarioSource,
    ScenarioVerdict, ServiceSummary, Test, TestCategory,
};

pub use crate::config::{BaselinePolicy, GapmapConfig};

pub use crate::engine::{AnalysisEngine, AnalysisInput};

pub use crate::matching::{HeuristicMatcher, HostedMatcher, SimilarityMatcher, SimilarityScore};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};

pub use crate::priority::classify;
