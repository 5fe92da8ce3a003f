use serde::Serialize;
use std::fmt;

/// Publish処理の内部ステップ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishStep {
    Identity,
    Stage,
    Status,
    Commit,
    Push,
}

impl PublishStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStep::Identity => "configure-identity",
            PublishStep::Stage => "stage",
            PublishStep::Status => "status",
            PublishStep::Commit => "commit",
            PublishStep::Push => "push",
        }
    }
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publishの結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum SyncOutcome {
    /// 作業ツリーがクリーンだった（コミットもプッシュもしていない）
    NothingToCommit,
    /// コミットしてプッシュした
    CommittedAndPushed { branch: String, message: String },
    /// 失敗。完了済みのステップはロールバックしない
    Failed {
        step: PublishStep,
        reason: String,
        /// ローカルにコミットが作成済み（プッシュ失敗でリモートより先行している）
        local_commit: bool,
    },
}

impl SyncOutcome {
    pub fn failed(step: PublishStep, reason: impl Into<String>) -> Self {
        Self::Failed {
            step,
            reason: reason.into(),
            local_commit: matches!(step, PublishStep::Push),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToCommit => f.write_str("nothing to commit"),
            Self::CommittedAndPushed { branch, .. } => {
                write!(f, "committed and pushed to '{}'", branch)
            }
            Self::Failed { step, reason, .. } => write!(f, "failed at {}: {}", step, reason),
        }
    }
}
