use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::application::services::publisher::Publisher;
use crate::common::error::TidyError;
use crate::common::result::{ResultExt, TidyResult};
use crate::domain::entities::pipeline_config::PipelineConfig;
use crate::domain::entities::sync_outcome::SyncOutcome;
use crate::infrastructure::git::GitCli;
use crate::infrastructure::process::CommandRunner;

/// `trigger` コマンドの既定のコミットメッセージ
pub const DEFAULT_TRIGGER_MESSAGE: &str = "Routine CI trigger commit at {{timestamp}}";

/// CI トリガーの結果
#[derive(Debug, Clone, Serialize)]
pub struct TriggerReport {
    pub trigger_file: PathBuf,
    pub outcome: SyncOutcome,
}

/// トリガーファイルに1行追記して、その変更を Publish する
pub struct TriggerCiUseCase {
    config: PipelineConfig,
    runner: Arc<dyn CommandRunner>,
}

impl TriggerCiUseCase {
    pub fn new(config: PipelineConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub async fn execute(&self, message_template: Option<&str>) -> TidyResult<TriggerReport> {
        self.config.validate_all()?;
        let now = Local::now();
        let trigger_file = self.append_marker(now)?;

        let message = self
            .config
            .render_commit_message(message_template.unwrap_or(DEFAULT_TRIGGER_MESSAGE), now);
        let git = GitCli::new(Arc::clone(&self.runner), &self.config.base_dir);
        let outcome = Publisher::new(git, self.config.author.clone())
            .publish(&self.config.branch, &message)
            .await;

        if let SyncOutcome::Failed {
            step,
            reason,
            local_commit,
        } = &outcome
        {
            return Err(TidyError::PublishFailed {
                step: *step,
                reason: reason.clone(),
                local_commit: *local_commit,
            });
        }

        Ok(TriggerReport {
            trigger_file,
            outcome,
        })
    }

    /// `# CI trigger <RFC3339>` をトリガーファイルの末尾に追記する
    fn append_marker(&self, now: DateTime<Local>) -> TidyResult<PathBuf> {
        let path = self.config.trigger_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_filesystem_error("Failed to create directory", Some(parent.to_path_buf()))?;
        }

        let needs_newline = fs::read(&path)
            .map(|content| !content.is_empty() && !content.ends_with(b"\n"))
            .unwrap_or(false);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_filesystem_error("Failed to open trigger file", Some(path.clone()))?;
        let separator = if needs_newline { "\n" } else { "" };
        writeln!(file, "{}# CI trigger {}", separator, now.to_rfc3339())
            .with_filesystem_error("Failed to write trigger file", Some(path.clone()))?;

        info!(path = %path.display(), "trigger marker appended");
        Ok(path)
    }
}
