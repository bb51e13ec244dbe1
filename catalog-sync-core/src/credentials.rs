//! Environment-backed credential set.
//!
//! [`Credentials`] is populated once at process start and passed by reference
//! into the pipeline. It never re-reads the environment afterwards.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use base64::Engine;
use tracing::{debug, error, info};

use crate::contract::CredentialProvider;
use crate::temp_files::TempFileSet;

pub const SHOPIFY_STORE_URL: &str = "SHOPIFY_STORE_URL";
pub const SHOPIFY_ACCESS_TOKEN: &str = "SHOPIFY_ACCESS_TOKEN";
pub const SHOPIFY_API_VERSION: &str = "SHOPIFY_API_VERSION";
pub const GOOGLE_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
pub const GOOGLE_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
pub const GOOGLE_REFRESH_TOKEN: &str = "GOOGLE_REFRESH_TOKEN";
pub const JOTTACLOUD_USERNAME: &str = "JOTTACLOUD_USERNAME";
pub const JOTTACLOUD_PASSWORD: &str = "JOTTACLOUD_PASSWORD";
pub const RCLONE_CONFIG: &str = "RCLONE_CONFIG";

pub const DEFAULT_API_VERSION: &str = "2024-07";

/// Settings required by the catalog sync pipeline.
pub const CATALOG_SETTINGS: [&str; 2] = [SHOPIFY_STORE_URL, SHOPIFY_ACCESS_TOKEN];

/// Settings required by the cloud-storage consumer.
pub const CLOUD_SETTINGS: [&str; 6] = [
    GOOGLE_CLIENT_ID,
    GOOGLE_CLIENT_SECRET,
    GOOGLE_REFRESH_TOKEN,
    JOTTACLOUD_USERNAME,
    JOTTACLOUD_PASSWORD,
    RCLONE_CONFIG,
];

/// Every setting some consumer requires, in the order they are checked and reported.
pub const REQUIRED_SETTINGS: [&str; 8] = [
    SHOPIFY_STORE_URL,
    SHOPIFY_ACCESS_TOKEN,
    GOOGLE_CLIENT_ID,
    GOOGLE_CLIENT_SECRET,
    GOOGLE_REFRESH_TOKEN,
    JOTTACLOUD_USERNAME,
    JOTTACLOUD_PASSWORD,
    RCLONE_CONFIG,
];

const KNOWN_SETTINGS: [&str; 9] = [
    SHOPIFY_STORE_URL,
    SHOPIFY_ACCESS_TOKEN,
    SHOPIFY_API_VERSION,
    GOOGLE_CLIENT_ID,
    GOOGLE_CLIENT_SECRET,
    GOOGLE_REFRESH_TOKEN,
    JOTTACLOUD_USERNAME,
    JOTTACLOUD_PASSWORD,
    RCLONE_CONFIG,
];

/// Failure to turn the encoded rclone config into a file on disk.
#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("RCLONE_CONFIG is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("decoded RCLONE_CONFIG is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("failed to write temporary config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to keep temporary config file: {0}")]
    Keep(#[from] tempfile::PersistError),
}

/// Flat mapping of setting name to value, captured once.
#[derive(Clone, Default)]
pub struct Credentials {
    values: HashMap<String, String>,
}

impl Credentials {
    /// Capture every known setting from the process environment.
    pub fn from_env() -> Self {
        let values: HashMap<String, String> = KNOWN_SETTINGS
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
            .collect();
        info!(
            settings_found = values.len(),
            settings_known = KNOWN_SETTINGS.len(),
            "Loaded credentials from environment"
        );
        Self { values }
    }

    /// Build a credential set from explicit pairs (used by tests and embedding callers).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Decode `RCLONE_CONFIG` into a fresh temporary file tracked by `temps`.
    ///
    /// Returns `None` both when the setting is absent and when decoding or
    /// writing fails; the latter is logged at error level.
    pub fn materialize_encoded_config(&self, temps: &mut TempFileSet) -> Option<PathBuf> {
        match self.try_materialize_encoded_config(temps) {
            Ok(Some(path)) => Some(path),
            Ok(None) => {
                debug!("RCLONE_CONFIG not set, no config file materialized");
                None
            }
            Err(e) => {
                error!(error = %e, "Failed to set up rclone configuration");
                None
            }
        }
    }

    pub fn try_materialize_encoded_config(
        &self,
        temps: &mut TempFileSet,
    ) -> Result<Option<PathBuf>, MaterializeError> {
        let Some(encoded) = self.get(RCLONE_CONFIG).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };

        // Encoders such as coreutils `base64` wrap their output at 76 columns.
        let compact: String = encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
        let text = String::from_utf8(bytes)?;

        let mut file = tempfile::Builder::new()
            .prefix("rclone-")
            .suffix(".conf")
            .tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        let (_, path) = file.keep()?;

        info!(path = %path.display(), bytes = text.len(), "Materialized rclone configuration");
        temps.track(path.clone());
        Ok(Some(path))
    }
}

impl CredentialProvider for Credentials {
    fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Credentials")
            .field("set", &names)
            .field("values", &"[REDACTED]")
            .finish()
    }
}
