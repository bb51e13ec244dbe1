/// `load_config` module: loads the optional static YAML config for the CLI.
///
/// The file only ever holds non-secret settings (where output files go).
/// Credentials come from the environment through
/// [`catalog_sync_core::credentials::Credentials`] and are never read here.
///
/// # Accepted schema
/// ```yaml
/// output:
///   output_dir: ./sync-output/data
///   site_data_dir: ./static/data
/// ```
/// Both keys, and the `output` section itself, are optional.
///
/// # Errors
/// Unreadable or malformed files produce an `anyhow::Error` naming the path
/// or the parse failure, and are surfaced at the CLI boundary.
use anyhow::Result;
use catalog_sync_core::config::OutputConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub output: OutputConfig,
}

impl CliConfig {
    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(
        mut self,
        output_dir: Option<PathBuf>,
        site_data_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = output_dir {
            self.output.output_dir = dir;
        }
        if let Some(dir) = site_data_dir {
            self.output.site_data_dir = dir;
        }
        self
    }
}

/// Loads a static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(CliConfig::default());
    }

    match serde_yaml::from_str::<CliConfig>(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}
