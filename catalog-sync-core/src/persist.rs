//! Writing the sync documents to every output directory.
//!
//! Each document is serialized once, so all copies are byte-identical. Every
//! destination is written independently: one failing directory never stops
//! the others.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info};

use crate::transform::SyncDocument;

pub const PRODUCTS_FILE: &str = "shopify-products.json";
pub const SUMMARY_FILE: &str = "shopify-summary.json";

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to serialize {file}: {source}")]
    Serialize {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to create directory {}: {source}", .dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A destination file that could not be written, kept for the sync report.
#[derive(Debug, Clone)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// What happened to each destination file in one persistence pass.
#[derive(Debug, Default)]
pub struct PersistOutcome {
    pub written: Vec<PathBuf>,
    pub failed: Vec<WriteFailure>,
}

impl PersistOutcome {
    /// True if `file_name` reached at least one directory.
    pub fn wrote(&self, file_name: &str) -> bool {
        self.written
            .iter()
            .any(|p| p.file_name().is_some_and(|n| n == file_name))
    }

    fn record(&mut self, path: PathBuf, result: Result<(), PersistError>) {
        match result {
            Ok(()) => self.written.push(path),
            Err(e) => self.failed.push(WriteFailure {
                path,
                reason: e.to_string(),
            }),
        }
    }
}

/// Serialize `value` as two-space indented UTF-8 JSON.
pub fn to_json_bytes<T: Serialize + ?Sized>(
    file: &'static str,
    value: &T,
) -> Result<Vec<u8>, PersistError> {
    serde_json::to_vec_pretty(value).map_err(|source| PersistError::Serialize { file, source })
}

/// Write `bytes` to `dir/file_name`, creating `dir` if needed.
pub fn write_file(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<(), PersistError> {
    std::fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
        dir: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes).map_err(|source| PersistError::Write { path, source })
}

fn write_everywhere(
    outcome: &mut PersistOutcome,
    destinations: &[&Path],
    file_name: &'static str,
    bytes: &[u8],
) {
    for dir in destinations {
        let path = dir.join(file_name);
        let result = write_file(dir, file_name, bytes);
        match &result {
            Ok(()) => info!(path = %path.display(), bytes = bytes.len(), "[SYNC][WRITE] Saved file"),
            Err(e) => error!(error = %e, path = %path.display(), "[SYNC][WRITE] Failed to save file"),
        }
        outcome.record(path, result);
    }
}

/// Write the products document and its summary into every directory in `destinations`.
pub fn persist_documents(document: &SyncDocument, destinations: &[&Path]) -> PersistOutcome {
    let mut outcome = PersistOutcome::default();

    let documents: [(&'static str, Result<Vec<u8>, PersistError>); 2] = [
        (PRODUCTS_FILE, to_json_bytes(PRODUCTS_FILE, document)),
        (SUMMARY_FILE, to_json_bytes(SUMMARY_FILE, &document.summary())),
    ];

    for (file_name, serialized) in documents {
        match serialized {
            Ok(bytes) => write_everywhere(&mut outcome, destinations, file_name, &bytes),
            Err(e) => {
                error!(error = %e, file = file_name, "[SYNC][WRITE] Could not serialize document");
                for dir in destinations {
                    outcome.failed.push(WriteFailure {
                        path: dir.join(file_name),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    outcome
}
