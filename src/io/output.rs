use crate::core::{ApiStatus, Gap, Priority, Result, ServiceSummary, TestCategory};
use colored::*;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Terminal,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "table" | "terminal" => Ok(Self::Terminal),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

pub trait OutputWriter {
    fn write_summary(&mut self, summary: &ServiceSummary) -> Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_summary(&mut self, summary: &ServiceSummary) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, summary)?;
        writeln!(self.writer)?;
        Ok(())
    }
}

/// Human-readable report: headline metrics, per-API rollup, gaps by priority.
pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_header(&mut self, summary: &ServiceSummary) -> Result<()> {
        let title = match &summary.service {
            Some(service) => format!("Gapmap Coverage Report: {service}"),
            None => "Gapmap Coverage Report".to_string(),
        };
        writeln!(self.writer, "{}", title.bold().blue())?;
        writeln!(self.writer, "{}", "=".repeat(title.len()).blue())?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_metrics(&mut self, summary: &ServiceSummary) -> Result<()> {
        let counts = &summary.counts;
        writeln!(self.writer, "{}", "Summary:".bold())?;
        writeln!(self.writer, "  Coverage: {}", coverage_display(summary.coverage_percent))?;
        writeln!(
            self.writer,
            "  Scenarios: {} active, {} fully, {} partially, {} not covered",
            counts.active_scenarios,
            counts.fully_covered,
            counts.partially_covered,
            counts.not_covered
        )?;
        writeln!(
            self.writer,
            "  Gaps: {} (P0 {}, P1 {}, P2 {}, P3 {})",
            summary.blocking_gaps,
            summary.priority_histogram.p0,
            summary.priority_histogram.p1,
            summary.priority_histogram.p2,
            summary.priority_histogram.p3
        )?;
        let technical = summary
            .orphan_tests
            .iter()
            .filter(|o| o.category == TestCategory::Technical)
            .count();
        writeln!(
            self.writer,
            "  Orphan tests: {} ({} technical), orphan APIs: {}",
            summary.orphan_tests.len(),
            technical,
            summary.orphan_apis.len()
        )?;
        if summary.matcher_unavailable_count > 0 {
            writeln!(
                self.writer,
                "  {} {} comparison(s) could not be evaluated",
                "Warning:".yellow().bold(),
                summary.matcher_unavailable_count
            )?;
        }
        if !summary.scope_mismatches.is_empty() {
            writeln!(
                self.writer,
                "  {} {} entit(ies) scoped to unknown APIs were excluded",
                "Warning:".yellow().bold(),
                summary.scope_mismatches.len()
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_apis(&mut self, summary: &ServiceSummary) -> Result<()> {
        if summary.api_summaries.is_empty() {
            return Ok(());
        }

        let width = summary
            .api_summaries
            .iter()
            .map(|s| s.api_key.as_str().len())
            .max()
            .unwrap_or(0)
            .max("API".len());

        writeln!(self.writer, "{}", "APIs:".bold())?;
        writeln!(
            self.writer,
            "  {:<width$}  {:>8}  {:>9}  {:>7}  {:>7}  NOTES",
            "API", "COVERAGE", "SCENARIOS", "MISSING", "ORPHANS"
        )?;
        for api in &summary.api_summaries {
            let mut notes = Vec::new();
            if api.status == ApiStatus::Orphan {
                notes.push("orphan".red().to_string());
            }
            if api.baseline_incomplete {
                notes.push("baseline incomplete".yellow().to_string());
            }
            let coverage = api
                .coverage_percent
                .map(|p| format!("{p:.1}%"))
                .unwrap_or_else(|| "n/a".to_string());
            writeln!(
                self.writer,
                "  {:<width$}  {:>8}  {:>9}  {:>7}  {:>7}  {}",
                api.api_key.as_str(),
                coverage,
                api.counts.active_scenarios,
                api.missing_suggestions,
                api.business_orphan_tests + api.technical_orphan_tests,
                notes.join(", ")
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_gaps(&mut self, summary: &ServiceSummary) -> Result<()> {
        if summary.gaps.is_empty() {
            writeln!(self.writer, "{}", "No gaps found".green().bold())?;
            return Ok(());
        }

        writeln!(self.writer, "{}", "Gaps:".bold())?;
        for gap in &summary.gaps {
            self.write_gap(gap)?;
        }
        Ok(())
    }

    fn write_gap(&mut self, gap: &Gap) -> Result<()> {
        let marker = if gap.matcher_unavailable { " (unevaluated)" } else { "" };
        writeln!(
            self.writer,
            "  {} {} {}{}",
            priority_badge(gap.priority),
            gap.kind.to_string().bold(),
            gap.api_key,
            marker
        )?;
        writeln!(self.writer, "      {}", gap.description)?;
        writeln!(self.writer, "      -> {}", gap.recommendation.dimmed())?;
        Ok(())
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_summary(&mut self, summary: &ServiceSummary) -> Result<()> {
        self.write_header(summary)?;
        self.write_metrics(summary)?;
        self.write_apis(summary)?;
        self.write_gaps(summary)?;
        Ok(())
    }
}

fn coverage_display(percent: Option<f64>) -> String {
    match percent {
        None => "no data".dimmed().to_string(),
        Some(p) if p >= 80.0 => format!("{p:.1}%").green().to_string(),
        Some(p) if p >= 50.0 => format!("{p:.1}%").yellow().to_string(),
        Some(p) => format!("{p:.1}%").red().to_string(),
    }
}

fn priority_badge(priority: Priority) -> ColoredString {
    let label = format!("[{priority}]");
    match priority {
        Priority::P0 => label.red().bold(),
        Priority::P1 => label.red(),
        Priority::P2 => label.yellow(),
        Priority::P3 => label.normal(),
    }
}

pub fn create_writer<'w>(
    format: OutputFormat,
    writer: Box<dyn Write + 'w>,
) -> Box<dyn OutputWriter + 'w> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer)),
    }
}
