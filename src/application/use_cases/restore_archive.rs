use crate::application::services::undo_ledger::UndoLedgerService;
use crate::common::error::TidyError;
use crate::common::result::TidyResult;
use crate::domain::entities::pipeline_config::PipelineConfig;
use crate::domain::entities::undo_ledger::{RestoreReport, UndoLedger};
use crate::infrastructure::filesystem::LockFile;

/// 直前のアーカイブを取り消すユースケース
pub struct RestoreArchiveUseCase {
    config: PipelineConfig,
}

impl RestoreArchiveUseCase {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    fn service(&self) -> UndoLedgerService {
        UndoLedgerService::new(self.config.ledger_path())
    }

    /// ロックを取得して台帳の内容を元に戻す
    pub async fn execute(&self) -> TidyResult<RestoreReport> {
        if !self.config.base_dir.is_dir() {
            return Err(TidyError::path_not_found(&self.config.base_dir));
        }
        let _lock = LockFile::acquire(self.config.lock_path())?;
        self.service().restore()
    }

    /// 未復元の台帳（無ければ `None`）
    pub fn pending(&self) -> TidyResult<Option<UndoLedger>> {
        match self.service().load() {
            Ok(ledger) => Ok(Some(ledger)),
            Err(TidyError::LedgerMissing { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
