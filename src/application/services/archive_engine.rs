use chrono::{DateTime, Local};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::common::error::TidyError;
use crate::common::result::{ResultExt, TidyResult};
use crate::domain::entities::archive_batch::{
    ArchiveBatch, ArchiveReport, FailedMove, MoveRecord, SkipReason, SkippedEntry,
};
use crate::domain::entities::pipeline_config::{
    FailurePolicy, MatchMode, PipelineConfig, LOCK_FILE_NAME,
};
use crate::domain::entities::unwanted_list::{UnwantedEntry, UnwantedFileList};
use crate::infrastructure::filesystem::file_mover::{path_exists, relocate};

/// 移動してよいかを判定するフック（既定は常に許可）
pub type ConfirmFn = dyn Fn(&Path) -> bool + Send + Sync;

/// 不要ファイルをタイムスタンプ付きのアーカイブへ移動するエンジン
///
/// エントリは1件ずつ順番に処理する。途中で失敗しても、それまでに移動したファイルの
/// 記録はレポートに残る。
pub struct ArchiveEngine {
    config: PipelineConfig,
    confirm: Option<Arc<ConfirmFn>>,
}

impl ArchiveEngine {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            confirm: None,
        }
    }

    /// 1ファイルごとの確認フックを設定
    pub fn with_confirm(mut self, confirm: Arc<ConfirmFn>) -> Self {
        self.confirm = Some(confirm);
        self
    }

    /// アーカイブ処理を1回実行する
    ///
    /// 見つからないエントリはスキップとして記録される（エラーにはならない）。
    /// 移動の失敗は `failure_policy` に従い、`abort` の場合は最初の失敗で処理を止める。
    pub fn archive(
        &self,
        list: &UnwantedFileList,
        timestamp: DateTime<Local>,
    ) -> TidyResult<ArchiveReport> {
        let base_dir = &self.config.base_dir;
        if !base_dir.is_dir() {
            return Err(TidyError::path_not_found(base_dir));
        }

        let canonical_base = base_dir
            .canonicalize()
            .with_filesystem_error("Failed to resolve base directory", Some(base_dir.clone()))?;
        let batch = ArchiveBatch::new(base_dir, &self.config.archive_prefix, timestamp);
        let mut report = ArchiveReport::default();

        info!(
            batch = batch.name(),
            entries = list.len(),
            mode = ?self.config.match_mode,
            "starting archive pass"
        );

        'entries: for entry in list.entries() {
            let Some(relative) = entry.normalized_relative() else {
                warn!(entry = entry.as_str(), line = entry.line(), "entry is absolute or leaves the base directory, skipping");
                report.skipped.push(skipped(entry, None, SkipReason::OutsideBase));
                continue;
            };

            let candidates = match self.config.match_mode {
                MatchMode::Direct => {
                    if path_exists(&base_dir.join(&relative)) {
                        vec![relative]
                    } else {
                        Vec::new()
                    }
                }
                MatchMode::Search => self.search(&relative)?,
            };

            if candidates.is_empty() {
                warn!(entry = entry.as_str(), line = entry.line(), "not found, skipping");
                report.skipped.push(skipped(entry, None, SkipReason::NotFound));
                continue;
            }

            for relative in candidates {
                let source = base_dir.join(&relative);

                if !resolves_inside(&source, &canonical_base) {
                    warn!(path = %source.display(), "path resolves outside the base directory, skipping");
                    report.skipped.push(skipped(entry, Some(source), SkipReason::OutsideBase));
                    continue;
                }

                if self.is_protected(&relative) {
                    warn!(path = %source.display(), "protected path, skipping");
                    report.skipped.push(skipped(entry, Some(source), SkipReason::Protected));
                    continue;
                }

                if let Some(confirm) = &self.confirm {
                    if !confirm(&source) {
                        info!(path = %source.display(), "move declined");
                        report.skipped.push(skipped(entry, Some(source), SkipReason::Declined));
                        continue;
                    }
                }

                let destination = batch.destination_for(&relative);
                match relocate(&source, &destination) {
                    Ok(()) => {
                        debug!(from = %source.display(), to = %destination.display(), "moved");
                        report.moved.push(MoveRecord::new(source, destination));
                    }
                    Err(e) => {
                        warn!(path = %source.display(), error = %e, "move failed");
                        report.failed.push(FailedMove {
                            source,
                            destination,
                            error: e.to_string(),
                        });
                        if self.config.failure_policy == FailurePolicy::Abort {
                            break 'entries;
                        }
                    }
                }
            }
        }

        if !report.moved.is_empty() {
            report.batch_name = Some(batch.name().to_string());
            report.batch_root = Some(batch.root().to_path_buf());
        }

        info!(
            moved = report.moved.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "archive pass finished"
        );
        Ok(report)
    }

    /// ベースディレクトリ以下から、末尾のパス要素がエントリと一致するファイルを探す
    fn search(&self, relative: &Path) -> TidyResult<Vec<PathBuf>> {
        let base_dir = &self.config.base_dir;
        let mut matches = Vec::new();

        let walker = WalkDir::new(base_dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_pruned(e));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            let Ok(candidate) = entry.path().strip_prefix(base_dir) else {
                continue;
            };
            if candidate.ends_with(relative) {
                matches.push(candidate.to_path_buf());
            }
        }
        Ok(matches)
    }

    /// 走査しないディレクトリ（`.git` とアーカイブ）
    fn is_pruned(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        name == ".git" || (entry.depth() == 1 && name.starts_with(&self.config.archive_prefix))
    }

    /// 移動してはいけないパスか
    fn is_protected(&self, relative: &Path) -> bool {
        let first = match relative.components().next() {
            Some(Component::Normal(part)) => part.to_string_lossy(),
            _ => return true,
        };
        if first == ".git" || first.starts_with(&self.config.archive_prefix) {
            return true;
        }
        [
            self.config.ledger_file.as_path(),
            self.config.unwanted_list.as_path(),
            Path::new(LOCK_FILE_NAME),
        ]
        .iter()
        .any(|protected| normalize(protected).as_deref() == Some(relative))
    }
}

fn skipped(entry: &UnwantedEntry, path: Option<PathBuf>, reason: SkipReason) -> SkippedEntry {
    SkippedEntry {
        entry: entry.as_str().to_string(),
        path,
        reason,
    }
}

/// `path` の親ディレクトリを実体化したとき `canonical_base` の内側にあるか
///
/// パス自体がシンボリックリンクならリンクそのものを移動するので、親だけを解決する。
fn resolves_inside(path: &Path, canonical_base: &Path) -> bool {
    path.parent()
        .and_then(|parent| parent.canonicalize().ok())
        .map_or(false, |parent| parent.starts_with(canonical_base))
}

fn normalize(path: &Path) -> Option<PathBuf> {
    UnwantedEntry::new(path.to_string_lossy(), 0).normalized_relative()
}
