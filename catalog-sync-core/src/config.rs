use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_OUTPUT_DIR: &str = "sync-output/data";
pub const DEFAULT_SITE_DATA_DIR: &str = "static/data";

/// Where the sync documents are written. Both directories receive identical copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pipeline-local output directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Static assets directory picked up by the site build.
    #[serde(default = "default_site_data_dir")]
    pub site_data_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_site_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SITE_DATA_DIR)
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            site_data_dir: default_site_data_dir(),
        }
    }
}

impl OutputConfig {
    pub fn destinations(&self) -> [&Path; 2] {
        [self.output_dir.as_path(), self.site_data_dir.as_path()]
    }

    pub fn trace_loaded(&self) {
        info!(
            output_dir = %self.output_dir.display(),
            site_data_dir = %self.site_data_dir.display(),
            "Loaded output config"
        );
        debug!(?self, "Output config loaded (full debug)");
    }
}
