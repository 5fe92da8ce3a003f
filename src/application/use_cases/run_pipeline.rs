use chrono::Local;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::application::services::archive_engine::{ArchiveEngine, ConfirmFn};
use crate::application::services::ci_generator::{CiGenerator, WorkflowTemplateGenerator};
use crate::application::services::publisher::Publisher;
use crate::application::services::repository_synchronizer::RepositorySynchronizer;
use crate::application::services::undo_ledger::UndoLedgerService;
use crate::common::error::TidyError;
use crate::common::result::TidyResult;
use crate::domain::entities::archive_batch::ArchiveReport;
use crate::domain::entities::pipeline_config::{FailurePolicy, LedgerPolicy, PipelineConfig};
use crate::domain::entities::stage::{Stage, StageSelection};
use crate::domain::entities::sync_outcome::SyncOutcome;
use crate::infrastructure::filesystem::{ConfigStore, LockFile};
use crate::infrastructure::git::GitCli;
use crate::infrastructure::process::CommandRunner;

/// ステージの進行を通知するフック（表示用）
pub trait PipelineObserver: Send + Sync {
    fn stage_started(&self, _stage: Stage) {}
    fn stage_finished(&self, _stage: Stage, _report: &PipelineReport) {}
    fn stage_failed(&self, _stage: Stage, _error: &TidyError) {}
}

/// 何もしないオブザーバー
#[derive(Debug, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// パイプライン実行の結果
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    /// Archive ステージの結果
    pub archive: Option<ArchiveReport>,
    /// GenerateCI ステージで書き出したファイル
    pub ci_files: Vec<PathBuf>,
    /// Publish ステージの結果
    pub publish: Option<SyncOutcome>,
    /// 完了したステージ（実行順）
    pub completed: Vec<Stage>,
}

/// Archive → GenerateCI → Sync → Publish を順に実行するユースケース
///
/// 各ステージは fail-fast で、失敗した時点で残りのステージは実行しない。
pub struct RunPipelineUseCase {
    config: PipelineConfig,
    runner: Arc<dyn CommandRunner>,
    ci_generator: Arc<dyn CiGenerator>,
    confirm: Option<Arc<ConfirmFn>>,
    observer: Arc<dyn PipelineObserver>,
}

impl RunPipelineUseCase {
    pub fn new(config: PipelineConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config,
            runner,
            ci_generator: Arc::new(WorkflowTemplateGenerator::new()),
            confirm: None,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_ci_generator(mut self, ci_generator: Arc<dyn CiGenerator>) -> Self {
        self.ci_generator = ci_generator;
        self
    }

    /// アーカイブ前の1ファイルごとの確認フック
    pub fn with_confirm(mut self, confirm: Arc<ConfirmFn>) -> Self {
        self.confirm = Some(confirm);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 選択されたステージを固定順で実行する
    pub async fn execute(&self, selection: &StageSelection) -> TidyResult<PipelineReport> {
        self.config.validate_all()?;
        let mut report = PipelineReport::default();

        for stage in selection.ordered() {
            self.observer.stage_started(stage);
            info!(stage = stage.as_str(), "stage started");

            let result = match stage {
                Stage::Archive => self.run_archive().map(|archive| {
                    report.archive = Some(archive);
                }),
                Stage::GenerateCi => self.ci_generator.generate(&self.config).map(|files| {
                    report.ci_files = files;
                }),
                Stage::Sync => self.run_sync().await,
                Stage::Publish => self.run_publish(&mut report).await,
            };

            if let Err(e) = result {
                error!(
                    stage = stage.as_str(),
                    operation = e.operation(),
                    error = %e,
                    "stage failed, aborting pipeline"
                );
                self.observer.stage_failed(stage, &e);
                return Err(TidyError::stage_failed(stage, e));
            }

            report.completed.push(stage);
            info!(stage = stage.as_str(), "stage finished");
            self.observer.stage_finished(stage, &report);
        }

        Ok(report)
    }

    fn git(&self) -> GitCli {
        GitCli::new(Arc::clone(&self.runner), &self.config.base_dir)
    }

    fn run_archive(&self) -> TidyResult<ArchiveReport> {
        if !self.config.base_dir.is_dir() {
            return Err(TidyError::path_not_found(&self.config.base_dir));
        }
        let _lock = LockFile::acquire(self.config.lock_path())?;

        let ledger = UndoLedgerService::new(self.config.ledger_path());
        if ledger.is_pending() {
            match self.config.ledger_policy {
                LedgerPolicy::Refuse => return Err(TidyError::ledger_pending(ledger.ledger_path())),
                LedgerPolicy::Overwrite => warn!(
                    path = %ledger.ledger_path().display(),
                    "replacing an unrestored undo ledger; its moves can no longer be undone"
                ),
            }
        }

        let list = ConfigStore::new().read_unwanted_list(&self.config)?;
        let mut engine = ArchiveEngine::new(self.config.clone());
        if let Some(confirm) = &self.confirm {
            engine = engine.with_confirm(Arc::clone(confirm));
        }

        let mut archive = engine.archive(&list, Local::now())?;
        if !archive.moved.is_empty() {
            ledger.save(&archive.moved)?;
            archive.ledger_path = Some(ledger.ledger_path().to_path_buf());
        }

        if self.config.failure_policy == FailurePolicy::Abort {
            if let Some(failure) = archive.failed.first() {
                return Err(TidyError::filesystem_error(
                    format!(
                        "Archive aborted after {} move(s): {}",
                        archive.moved.len(),
                        failure.error
                    ),
                    Some(failure.source.clone()),
                ));
            }
        }

        Ok(archive)
    }

    async fn run_sync(&self) -> TidyResult<()> {
        let remote_url = self.config.require_remote_url()?;
        RepositorySynchronizer::new(self.git(), self.config.remote_policy)
            .sync(remote_url, &self.config.branch)
            .await
    }

    async fn run_publish(&self, report: &mut PipelineReport) -> TidyResult<()> {
        let message = self
            .config
            .render_commit_message(&self.config.commit_message, Local::now());
        let outcome = Publisher::new(self.git(), self.config.author.clone())
            .publish(&self.config.branch, &message)
            .await;
        report.publish = Some(outcome.clone());

        match outcome {
            SyncOutcome::Failed {
                step,
                reason,
                local_commit,
            } => {
                if local_commit {
                    error!(
                        branch = %self.config.branch,
                        "local branch is ahead of origin; push manually once the remote accepts it"
                    );
                }
                Err(TidyError::PublishFailed {
                    step,
                    reason,
                    local_commit,
                })
            }
            _ => Ok(()),
        }
    }
}
