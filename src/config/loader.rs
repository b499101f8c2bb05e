use std::fs;
use std::path::{Path, PathBuf};

use super::core::GapmapConfig;
use crate::core::{Error, Result};

/// Config file name searched for in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = ".gapmap.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse and validate config from a TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<GapmapConfig> {
    let config = toml::from_str::<GapmapConfig>(contents)?;
    config.validate().map_err(Error::Configuration)?;
    Ok(config)
}

/// Load config from an explicit path. A missing file is an error here.
pub fn load_config_from_path(config_path: &Path) -> Result<GapmapConfig> {
    let contents = fs::read_to_string(config_path).map_err(|e| {
        Error::file_system(
            format!("Failed to read config file {}", config_path.display()),
            config_path,
            e,
        )
    })?;

    let config = parse_and_validate_config(&contents).map_err(|e| {
        Error::Configuration(format!("{}: {}", config_path.display(), e))
    })?;
    tracing::debug!(path = %config_path.display(), "Loaded config");
    Ok(config)
}

/// Generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for `.gapmap.toml`.
///
/// No file found means defaults; a file that exists but does not parse or
/// validate is an error.
pub fn load_config_from(start: &Path) -> Result<GapmapConfig> {
    match directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|path| path.is_file())
    {
        Some(path) => load_config_from_path(&path),
        None => {
            tracing::debug!(
                depth = MAX_TRAVERSAL_DEPTH,
                "No config found, using default config"
            );
            Ok(GapmapConfig::default())
        }
    }
}

/// Load config relative to the current working directory.
pub fn load_config() -> Result<GapmapConfig> {
    let current = std::env::current_dir()?;
    load_config_from(&current)
}
