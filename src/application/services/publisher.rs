use tracing::{info, warn};

use crate::common::result::TidyResult;
use crate::domain::entities::pipeline_config::AuthorIdentity;
use crate::domain::entities::sync_outcome::{PublishStep, SyncOutcome};
use crate::domain::value_objects::branch_name::BranchName;
use crate::infrastructure::git::{GitCli, ORIGIN};

/// 変更があればステージ・コミット・プッシュする
///
/// 失敗しても完了済みのステップは巻き戻さない。結果は常に [`SyncOutcome`] で返す。
pub struct Publisher {
    git: GitCli,
    author: AuthorIdentity,
}

impl Publisher {
    pub fn new(git: GitCli, author: AuthorIdentity) -> Self {
        Self { git, author }
    }

    pub async fn publish(&self, branch: &BranchName, message: &str) -> SyncOutcome {
        if let Err(e) = self.ensure_identity().await {
            return failed(PublishStep::Identity, e.to_string());
        }

        if let Err(e) = self.git.add_all().await {
            return failed(PublishStep::Stage, e.to_string());
        }

        match self.git.status_porcelain().await {
            Ok(changes) if changes.is_empty() => {
                info!("working copy clean, nothing to commit");
                return SyncOutcome::NothingToCommit;
            }
            Ok(changes) => info!(changes = changes.len(), "committing pending changes"),
            Err(e) => return failed(PublishStep::Status, e.to_string()),
        }

        if let Err(e) = self.git.commit(message).await {
            return failed(PublishStep::Commit, e.to_string());
        }

        if let Err(e) = self.git.push_upstream(ORIGIN, branch.as_str()).await {
            warn!(branch = %branch, "push failed after a local commit; the local branch is ahead of origin");
            return failed(PublishStep::Push, e.to_string());
        }

        info!(branch = %branch, "committed and pushed");
        SyncOutcome::CommittedAndPushed {
            branch: branch.to_string(),
            message: message.to_string(),
        }
    }

    /// 作者情報が未設定の場合だけ既定値を設定する
    async fn ensure_identity(&self) -> TidyResult<()> {
        if self.git.config_get("user.name").await?.is_none() {
            info!(name = %self.author.name, "setting default git user.name");
            self.git.config_set("user.name", &self.author.name).await?;
        }
        if self.git.config_get("user.email").await?.is_none() {
            info!(email = %self.author.email, "setting default git user.email");
            self.git.config_set("user.email", &self.author.email).await?;
        }
        Ok(())
    }
}

fn failed(step: PublishStep, reason: String) -> SyncOutcome {
    warn!(step = step.as_str(), reason = %reason, "publish failed");
    SyncOutcome::failed(step, reason)
}
