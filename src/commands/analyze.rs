use crate::config::{self, GapmapConfig, ParallelConfig};
use crate::config::{BaselinePolicy, MatcherBackend};
use crate::core::{Priority, ServiceSummary};
use crate::engine::AnalysisEngine;
use crate::io::{self, create_writer, OutputFormat};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

pub struct AnalyzeConfig {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub matcher: Option<MatcherBackend>,
    pub policy: Option<BaselinePolicy>,
    pub fail_on_gaps: Option<Priority>,
}

/// Result of the gap gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    Passed,
    Failed,
}

pub fn analyze(cfg: AnalyzeConfig) -> Result<GateStatus> {
    let settings = resolve_config(&cfg)?;
    let engine = AnalysisEngine::new(settings).context("Failed to set up the analysis engine")?;

    let input = io::read_input(&cfg.input)?;
    let summary = engine.run(&input)?;

    write_summary(&summary, cfg.format, cfg.output.as_ref())?;

    Ok(apply_gate(&summary, cfg.fail_on_gaps))
}

/// File config (explicit path or discovered) with command-line overrides.
fn resolve_config(cfg: &AnalyzeConfig) -> Result<GapmapConfig> {
    let mut settings = match &cfg.config {
        Some(path) => config::load_config_from_path(path)?,
        None => config::load_config()?,
    };

    if let Some(jobs) = cfg.jobs {
        settings.parallel = ParallelConfig::with_jobs(jobs);
    }
    if let Some(backend) = cfg.matcher {
        settings.matcher.backend = backend;
    }
    if let Some(policy) = cfg.policy {
        settings.policy.baseline_incomplete = policy;
    }

    settings
        .validate()
        .map_err(|message| anyhow::anyhow!("Invalid configuration: {message}"))?;
    Ok(settings)
}

fn write_summary(
    summary: &ServiceSummary,
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    let mut buffer = Vec::new();
    create_writer(format, Box::new(&mut buffer)).write_summary(summary)?;

    match output {
        Some(path) => {
            let content = String::from_utf8(buffer)?;
            io::write_file(path, &content)?;
            info!(path = %path.display(), "Wrote report");
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&buffer)?;
        }
    }
    Ok(())
}

pub fn apply_gate(summary: &ServiceSummary, fail_on: Option<Priority>) -> GateStatus {
    match fail_on {
        Some(threshold) if summary.has_blocking_gaps_at(threshold) => {
            warn!(
                threshold = %threshold,
                gaps = summary.priority_histogram.at_or_above(threshold),
                "Gap gate failed"
            );
            GateStatus::Failed
        }
        _ => GateStatus::Passed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{api, baseline, InputBuilder, ScriptedMatcher};
    use std::sync::Arc;

    fn summary_with_p1_gap() -> ServiceSummary {
        let input = InputBuilder::new()
            .api(api("GET", "/a"))
            .scenario(baseline("S1", "GET /a", "returns error on invalid page"))
            .build();
        AnalysisEngine::with_matcher(Default::default(), Arc::new(ScriptedMatcher::new()))
            .run(&input)
            .unwrap()
    }

    #[test]
    fn test_gate_thresholds() {
        let summary = summary_with_p1_gap();

        assert_eq!(apply_gate(&summary, None), GateStatus::Passed);
        assert_eq!(apply_gate(&summary, Some(Priority::P0)), GateStatus::Passed);
        assert_eq!(apply_gate(&summary, Some(Priority::P1)), GateStatus::Failed);
        assert_eq!(apply_gate(&summary, Some(Priority::P3)), GateStatus::Failed);
    }

    #[test]
    fn test_cli_overrides_win() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(config::CONFIG_FILE_NAME);
        std::fs::write(&path, "[policy]\nbaseline_incomplete = \"flag_only\"\n").unwrap();

        let settings = resolve_config(&AnalyzeConfig {
            input: PathBuf::from("unused.json"),
            config: Some(path),
            format: OutputFormat::Json,
            output: None,
            jobs: Some(3),
            matcher: None,
            policy: Some(BaselinePolicy::Downgrade),
            fail_on_gaps: None,
        })
        .unwrap();

        assert_eq!(settings.policy.baseline_incomplete, BaselinePolicy::Downgrade);
        assert_eq!(settings.parallel.effective_concurrency(), 3);
    }

    #[test]
    fn test_hosted_override_without_endpoint_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(config::CONFIG_FILE_NAME);
        std::fs::write(&path, "").unwrap();

        let result = resolve_config(&AnalyzeConfig {
            input: PathBuf::from("unused.json"),
            config: Some(path),
            format: OutputFormat::Json,
            output: None,
            jobs: None,
            matcher: Some(MatcherBackend::Hosted),
            policy: None,
            fail_on_gaps: None,
        });

        assert!(result.is_err());
    }
}
