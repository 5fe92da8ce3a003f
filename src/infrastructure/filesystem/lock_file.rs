use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::common::error::TidyError;
use crate::common::result::TidyResult;

/// Exclusive lock on a base directory, held while the archive or restore runs.
///
/// The lock file is created with `create_new` and removed when the guard is dropped.
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
}

impl LockFile {
    /// Acquire the lock, failing with `LedgerLocked` if another run holds it
    pub fn acquire(path: impl Into<PathBuf>) -> TidyResult<Self> {
        let path = path.into();
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(TidyError::ledger_locked(path));
            }
            Err(e) => {
                return Err(TidyError::filesystem_error_with_source(
                    "Failed to create lock file",
                    Some(path),
                    e,
                ))
            }
        };

        // pid is informational only
        let _ = writeln!(file, "{}", std::process::id());
        tracing::debug!(path = %path.display(), "lock acquired");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove lock file");
        } else {
            tracing::debug!(path = %self.path.display(), "lock released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_fails_until_released() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".tidysync.lock");

        let guard = LockFile::acquire(&path).unwrap();
        assert!(path.exists());
        assert!(matches!(
            LockFile::acquire(&path),
            Err(TidyError::LedgerLocked { .. })
        ));

        drop(guard);
        assert!(!path.exists());
        assert!(LockFile::acquire(&path).is_ok());
    }
}
