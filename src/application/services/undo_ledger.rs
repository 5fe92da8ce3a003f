use std::path::Path;
use tracing::{info, warn};

use crate::common::error::TidyError;
use crate::common::result::TidyResult;
use crate::domain::entities::archive_batch::MoveRecord;
use crate::domain::entities::undo_ledger::{RestoreReport, RestoreWarning, UndoLedger};
use crate::infrastructure::filesystem::file_mover::{path_exists, relocate};
use crate::infrastructure::filesystem::ledger_store::LedgerStore;

/// 台帳の保存と、それを使った復元
pub struct UndoLedgerService {
    store: LedgerStore,
}

impl UndoLedgerService {
    pub fn new(ledger_path: impl AsRef<Path>) -> Self {
        Self {
            store: LedgerStore::new(ledger_path.as_ref()),
        }
    }

    pub fn ledger_path(&self) -> &Path {
        self.store.path()
    }

    /// 未復元の台帳が存在するか
    pub fn is_pending(&self) -> bool {
        self.store.exists()
    }

    /// 移動記録を台帳として保存する（既存の台帳は置き換える）
    pub fn save(&self, records: &[MoveRecord]) -> TidyResult<()> {
        self.store.save(&UndoLedger::new(records.to_vec()))?;
        info!(path = %self.store.path().display(), records = records.len(), "undo ledger written");
        Ok(())
    }

    /// 保存されている台帳を読む
    pub fn load(&self) -> TidyResult<UndoLedger> {
        self.store.load()
    }

    /// 台帳のすべての移動を記録順に元へ戻し、台帳を削除する
    ///
    /// アーカイブ側のファイルが既に無いレコードは警告として扱う。
    /// 元の場所が既に使われているなど致命的な失敗では、未処理のレコードだけを台帳に
    /// 書き戻して `RestoreIncomplete` を返す。
    pub fn restore(&self) -> TidyResult<RestoreReport> {
        let records = self.store.load()?.into_records();
        let total = records.len();
        let mut report = RestoreReport {
            ledger_path: self.store.path().to_path_buf(),
            ..RestoreReport::default()
        };

        for (index, record) in records.iter().enumerate() {
            if !path_exists(&record.archived) {
                let message = if path_exists(&record.original) {
                    "already restored"
                } else {
                    "archived file is missing"
                };
                warn!(
                    archived = %record.archived.display(),
                    original = %record.original.display(),
                    reason = message,
                    "skipping ledger record"
                );
                report.warnings.push(RestoreWarning {
                    record: record.clone(),
                    message: message.to_string(),
                });
                continue;
            }

            let result = if path_exists(&record.original) {
                Err(TidyError::filesystem_error(
                    format!(
                        "{} exists in both the archive and its original location",
                        record.original.display()
                    ),
                    Some(record.original.clone()),
                ))
            } else {
                relocate(&record.archived, &record.original)
            };

            if let Err(e) = result {
                let remaining = records[index..].to_vec();
                self.store.save(&UndoLedger::new(remaining))?;
                return Err(TidyError::RestoreIncomplete {
                    restored: report.restored,
                    remaining: total - index,
                    message: e.to_string(),
                });
            }
            report.restored += 1;
        }

        self.store.delete()?;
        info!(
            restored = report.restored,
            warnings = report.warnings.len(),
            "undo ledger consumed"
        );
        Ok(report)
    }
}
