use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::archive_batch::MoveRecord;

/// 直前のアーカイブ処理を取り消すための台帳
///
/// `[[archived, original], ...]` の JSON 配列としてそのまま保存される。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UndoLedger {
    records: Vec<MoveRecord>,
}

impl UndoLedger {
    pub fn new(records: Vec<MoveRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<MoveRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 非致命的な復元警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreWarning {
    pub record: MoveRecord,
    pub message: String,
}

/// 復元処理の結果
#[derive(Debug, Clone, Default, Serialize)]
pub struct RestoreReport {
    /// 元の場所に戻したファイル数
    pub restored: usize,
    /// アーカイブ側のファイルが既に無かったレコード
    pub warnings: Vec<RestoreWarning>,
    pub ledger_path: PathBuf,
}
