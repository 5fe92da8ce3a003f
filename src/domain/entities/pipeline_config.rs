use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::common::error::TidyError;
use crate::common::result::{OptionExt, TidyResult};
use crate::common::templates::TemplateProcessor;
use crate::domain::value_objects::{branch_name::BranchName, remote_url::RemoteUrl};

/// ロックファイル名（ベースディレクトリ直下）
pub const LOCK_FILE_NAME: &str = ".tidysync.lock";

/// 不要ファイルの特定方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// エントリをベースディレクトリからの相対パスとして扱う
    #[default]
    Direct,
    /// ベースディレクトリ以下を走査し、末尾が一致するファイルを探す
    Search,
}

/// 1件の移動に失敗したときの方針
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// 失敗を記録して次のエントリへ進む
    #[default]
    Skip,
    /// アーカイブ処理全体を中断する
    Abort,
}

/// 未消費の台帳がある状態でアーカイブするときの方針
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LedgerPolicy {
    /// アーカイブを開始しない
    #[default]
    Refuse,
    /// 新しい台帳で置き換える（以前の取り消し情報は失われる）
    Overwrite,
}

/// 既存の origin の URL が設定と異なる場合の方針
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RemoteMismatchPolicy {
    /// `git remote set-url` で更新する
    #[default]
    Update,
    /// 同期ステージを失敗させる
    Fail,
}

/// git に作者情報が無い場合にだけ設定する既定の作者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AuthorIdentity {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 3))]
    pub email: String,
}

impl Default for AuthorIdentity {
    fn default() -> Self {
        Self {
            name: "tidysync".to_string(),
            email: "tidysync@localhost".to_string(),
        }
    }
}

/// CI定義ファイル生成の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CiSettings {
    pub workflow_path: PathBuf,
    pub python_version: String,
    pub write_test_stub: bool,
    pub test_stub_path: PathBuf,
}

impl Default for CiSettings {
    fn default() -> Self {
        Self {
            workflow_path: PathBuf::from(".github/workflows/ci.yml"),
            python_version: "3.11".to_string(),
            write_test_stub: true,
            test_stub_path: PathBuf::from("tests/test_dummy.py"),
        }
    }
}

fn validate_relative_path(path: &PathBuf) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() || path.is_absolute() {
        let mut error = ValidationError::new("relative_path");
        error.message = Some("must be a non-empty path relative to base_dir".into());
        return Err(error);
    }
    Ok(())
}

fn validate_archive_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.contains('/') || prefix.contains('\\') || prefix.starts_with('.') {
        let mut error = ValidationError::new("archive_prefix");
        error.message = Some("must be a plain directory name prefix".into());
        return Err(error);
    }
    Ok(())
}

/// パイプライン全体の設定
///
/// 各コンポーネントのコンストラクタに明示的に渡される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    /// 作業ツリーのルート
    pub base_dir: PathBuf,

    /// 不要ファイルリスト（base_dir からの相対パス）
    #[validate(custom(function = "validate_relative_path"))]
    pub unwanted_list: PathBuf,

    /// リモートリポジトリ（sync ステージで必須）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<RemoteUrl>,

    /// 同期・プッシュ対象のブランチ
    pub branch: BranchName,

    /// コミットメッセージ（`{{timestamp}}`、`{{branch}}` を置換）
    #[validate(length(min = 1))]
    pub commit_message: String,

    #[validate(length(min = 1), custom(function = "validate_archive_prefix"))]
    pub archive_prefix: String,

    #[validate(custom(function = "validate_relative_path"))]
    pub ledger_file: PathBuf,

    pub match_mode: MatchMode,
    pub failure_policy: FailurePolicy,
    pub ledger_policy: LedgerPolicy,
    pub remote_policy: RemoteMismatchPolicy,

    /// 外部コマンドのタイムアウト秒数（0 で無制限）
    pub command_timeout_secs: u64,

    pub author: AuthorIdentity,
    pub ci: CiSettings,

    /// `trigger` コマンドが追記するファイル
    #[validate(custom(function = "validate_relative_path"))]
    pub trigger_file: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            unwanted_list: PathBuf::from("unwanted_files.txt"),
            remote_url: None,
            branch: BranchName::default(),
            commit_message: "Add CI workflow and tests".to_string(),
            archive_prefix: "archive_unwanted_".to_string(),
            ledger_file: PathBuf::from("last_cleanup_undo.json"),
            match_mode: MatchMode::default(),
            failure_policy: FailurePolicy::default(),
            ledger_policy: LedgerPolicy::default(),
            remote_policy: RemoteMismatchPolicy::default(),
            command_timeout_secs: 300,
            author: AuthorIdentity::default(),
            ci: CiSettings::default(),
            trigger_file: PathBuf::from("tests/test_dummy.py"),
        }
    }
}

impl PipelineConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_remote_url(mut self, remote_url: RemoteUrl) -> Self {
        self.remote_url = Some(remote_url);
        self
    }

    pub fn with_branch(mut self, branch: BranchName) -> Self {
        self.branch = branch;
        self
    }

    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn with_ledger_policy(mut self, ledger_policy: LedgerPolicy) -> Self {
        self.ledger_policy = ledger_policy;
        self
    }

    /// base_dir からの相対パスを解決する（絶対パスはそのまま）
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn unwanted_list_path(&self) -> PathBuf {
        self.resolve(&self.unwanted_list)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.resolve(&self.ledger_file)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.base_dir.join(LOCK_FILE_NAME)
    }

    pub fn trigger_path(&self) -> PathBuf {
        self.resolve(&self.trigger_file)
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_secs > 0).then(|| Duration::from_secs(self.command_timeout_secs))
    }

    /// sync ステージ用にリモートURLを要求する
    pub fn require_remote_url(&self) -> TidyResult<&RemoteUrl> {
        self.remote_url.as_ref().ok_or_tidy(TidyError::config_error(
            "remote_url is required for the sync stage (set it in tidysync.yaml, --remote or TIDYSYNC_REMOTE)",
        ))
    }

    /// テンプレートからコミットメッセージを生成する
    pub fn render_commit_message(&self, template: &str, now: DateTime<Local>) -> String {
        TemplateProcessor::new()
            .with_value("timestamp", now.to_rfc3339())
            .with_value("branch", self.branch.as_str())
            .process(template)
    }

    /// 全フィールドを検証する
    pub fn validate_all(&self) -> TidyResult<()> {
        self.validate()
            .map_err(|e| TidyError::validation_error("config", e.to_string(), None))?;
        self.author
            .validate()
            .map_err(|e| TidyError::validation_error("author", e.to_string(), None))?;
        if self.ci.workflow_path.as_os_str().is_empty() {
            return Err(TidyError::validation_error(
                "ci.workflow_path",
                "must not be empty",
                None,
            ));
        }
        Ok(())
    }
}
