use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::common::error::TidyError;
use crate::common::result::{ResultExt, TidyResult};
use crate::domain::entities::undo_ledger::UndoLedger;

/// JSON persistence for the undo ledger at its well-known location
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the ledger, replacing any previous one.
    ///
    /// The JSON is written to a sibling temporary file and renamed into place so a
    /// crash never leaves a truncated ledger behind.
    pub fn save(&self, ledger: &UndoLedger) -> TidyResult<()> {
        let json = serde_json::to_string_pretty(ledger)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_filesystem_error(
                "Failed to create ledger directory",
                Some(parent.to_path_buf()),
            )?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)
            .with_filesystem_error("Failed to write undo ledger", Some(temp_path.clone()))?;
        fs::rename(&temp_path, &self.path)
            .with_filesystem_error("Failed to write undo ledger", Some(self.path.clone()))?;

        tracing::debug!(path = %self.path.display(), records = ledger.len(), "ledger saved");
        Ok(())
    }

    /// Read the ledger; `LedgerMissing` when none exists
    pub fn load(&self) -> TidyResult<UndoLedger> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TidyError::ledger_missing(&self.path));
            }
            Err(e) => {
                return Err(TidyError::filesystem_error_with_source(
                    "Failed to read undo ledger",
                    Some(self.path.clone()),
                    e,
                ))
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            TidyError::serialization_error_with_source(
                format!("Corrupt undo ledger {}", self.path.display()),
                e,
            )
        })
    }

    /// Remove the ledger file
    pub fn delete(&self) -> TidyResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TidyError::filesystem_error_with_source(
                "Failed to delete undo ledger",
                Some(self.path.clone()),
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::archive_batch::MoveRecord;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_save_load_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("last_cleanup_undo.json"));
        let ledger = UndoLedger::new(vec![MoveRecord::new(
            temp_dir.path().join("a.txt"),
            temp_dir.path().join("archive/a.txt"),
        )]);

        store.save(&ledger).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), ledger);
        assert!(!temp_dir.path().join("last_cleanup_undo.json.tmp").exists());

        store.delete().unwrap();
        assert!(matches!(store.load(), Err(TidyError::LedgerMissing { .. })));
    }

    #[test]
    fn test_save_replaces_previous_ledger() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("ledger.json"));

        store
            .save(&UndoLedger::new(vec![MoveRecord::new("/a", "/x/a")]))
            .unwrap();
        store
            .save(&UndoLedger::new(vec![MoveRecord::new("/b", "/x/b")]))
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.records(), &[MoveRecord::new("/b", "/x/b")]);
    }

    #[test]
    fn test_corrupt_ledger_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            LedgerStore::new(&path).load(),
            Err(TidyError::SerializationError { .. })
        ));
    }
}
