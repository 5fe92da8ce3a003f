use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// アーカイブバッチ名のタイムスタンプ形式
pub const BATCH_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// 1回のアーカイブ処理で作られるバッチ
///
/// `<base>/<prefix><YYYYMMDD_HHMMSS>` に配置される。処理完了後は変更せず、削除もしない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveBatch {
    name: String,
    root: PathBuf,
}

impl ArchiveBatch {
    /// タイムスタンプからバッチを作成
    ///
    /// 同名のディレクトリが既にある場合は `_1`、`_2` ... を付与する。
    pub fn new(base_dir: &Path, prefix: &str, timestamp: DateTime<Local>) -> Self {
        let stem = format!("{}{}", prefix, timestamp.format(BATCH_TIMESTAMP_FORMAT));
        let mut name = stem.clone();
        let mut suffix = 1;
        while base_dir.join(&name).exists() {
            name = format!("{}_{}", stem, suffix);
            suffix += 1;
        }
        Self {
            root: base_dir.join(&name),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 相対パスに対応するアーカイブ先
    pub fn destination_for(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}

/// 1ファイル分の移動記録
///
/// 台帳上は `(archived, original)` の2要素配列として保存される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(PathBuf, PathBuf)", into = "(PathBuf, PathBuf)")]
pub struct MoveRecord {
    pub original: PathBuf,
    pub archived: PathBuf,
}

impl MoveRecord {
    pub fn new(original: impl Into<PathBuf>, archived: impl Into<PathBuf>) -> Self {
        Self {
            original: original.into(),
            archived: archived.into(),
        }
    }
}

impl From<(PathBuf, PathBuf)> for MoveRecord {
    fn from((archived, original): (PathBuf, PathBuf)) -> Self {
        Self { original, archived }
    }
}

impl From<MoveRecord> for (PathBuf, PathBuf) {
    fn from(record: MoveRecord) -> Self {
        (record.archived, record.original)
    }
}

/// エントリをスキップした理由
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// どこにも見つからなかった
    NotFound,
    /// 絶対パス、またはベースディレクトリの外を指している
    OutsideBase,
    /// `.git`、台帳、アーカイブディレクトリなど移動してはいけないパス
    Protected,
    /// 確認フックが拒否した
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub entry: String,
    pub path: Option<PathBuf>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub error: String,
}

/// アーカイブ処理の結果
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveReport {
    /// バッチ名（1件も移動しなかった場合は `None`）
    pub batch_name: Option<String>,
    pub batch_root: Option<PathBuf>,
    /// 実際に移動したファイル（処理順）
    pub moved: Vec<MoveRecord>,
    pub skipped: Vec<SkippedEntry>,
    pub failed: Vec<FailedMove>,
    /// 台帳を書き出した場合のパス
    pub ledger_path: Option<PathBuf>,
}

impl ArchiveReport {
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}
