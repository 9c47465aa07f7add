//! Config file reading utilities

use crate::error::{CliError, CliResult};
use pipeline_model::ConverterConfig;
use std::fs;
use std::path::Path;

/// Config file picked up from the current directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = ".pipeline-model.yaml";

/// Load converter policies from `path`, or from the default file if it exists.
///
/// An explicit path must exist. Without one, a missing default file means
/// default policies.
pub fn load(path: Option<&str>) -> CliResult<ConverterConfig> {
    let path = match path {
        Some(path) => Path::new(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if !default_path.exists() {
                return Ok(ConverterConfig::default());
            }
            default_path
        }
    };

    let content = fs::read_to_string(path).map_err(|e| {
        CliError::Message(format!("Failed to read config file {}: {e}", path.display()))
    })?;
    let config = parse(&content, path)?;
    tracing::debug!(path = %path.display(), ?config, "loaded converter config");
    Ok(config)
}

fn parse(content: &str, path: &Path) -> CliResult<ConverterConfig> {
    // An empty file is a valid, all-defaults config
    if content.trim().is_empty() {
        return Ok(ConverterConfig::default());
    }
    serde_yaml::from_str(content).map_err(|source| CliError::Config {
        path: path.display().to_string(),
        source,
    })
}
