//! Scoped ownership of temporary files derived from credentials.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Paths of temporary files that must not outlive the process.
///
/// Files are removed by [`TempFileSet::cleanup`], which also runs on drop, so
/// early returns and unwinding both leave nothing behind.
#[derive(Debug, Default)]
pub struct TempFileSet {
    paths: Vec<PathBuf>,
}

impl TempFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, path: PathBuf) {
        debug!(path = %path.display(), "Tracking temporary file");
        self.paths.push(path);
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Delete every tracked file and forget it. Returns how many files were removed.
    ///
    /// Files that are already gone are skipped; other failures are logged and
    /// do not stop the remaining deletions.
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "Removed temporary file");
                    removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(error = ?e, path = %path.display(), "Could not delete temporary file");
                }
            }
        }
        removed
    }
}

impl Drop for TempFileSet {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Run `f` with a fresh [`TempFileSet`], cleaning it up before returning.
pub fn with_temp_files<T>(f: impl FnOnce(&mut TempFileSet) -> T) -> T {
    let mut temps = TempFileSet::new();
    let out = f(&mut temps);
    temps.cleanup();
    out
}
