//! Input bundle loading and summary output.

pub mod output;

pub use output::{create_writer, JsonWriter, OutputFormat, OutputWriter, TerminalWriter};

use crate::core::{Error, Result, ResultExt};
use crate::engine::AnalysisInput;
use std::fs;
use std::path::Path;

/// Read an input bundle: `{ "service", "apis", "scenarios", "tests" }`.
///
/// `.yaml`/`.yml` files are parsed as YAML, everything else as JSON.
pub fn read_input(path: &Path) -> Result<AnalysisInput> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::file_system("cannot read input bundle", path, e))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let parsed = if is_yaml {
        parse_yaml_input(&content)
    } else {
        parse_input(&content)
    };
    parsed.context(format!("Failed to parse {}", path.display()))
}

pub fn parse_input(content: &str) -> Result<AnalysisInput> {
    Ok(serde_json::from_str(content)?)
}

pub fn parse_yaml_input(content: &str) -> Result<AnalysisInput> {
    Ok(serde_yaml::from_str(content)?)
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
