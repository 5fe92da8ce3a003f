use tracing::{debug, info, warn};

use crate::common::error::TidyError;
use crate::common::result::TidyResult;
use crate::domain::entities::pipeline_config::RemoteMismatchPolicy;
use crate::domain::value_objects::{branch_name::BranchName, remote_url::RemoteUrl};
use crate::infrastructure::git::{GitCli, ORIGIN};

/// ローカル作業ツリーをリモートリポジトリに結び付け、対象ブランチをチェックアウトする
///
/// 何度呼んでも `origin` を重複して作らない。
pub struct RepositorySynchronizer {
    git: GitCli,
    remote_policy: RemoteMismatchPolicy,
}

impl RepositorySynchronizer {
    pub fn new(git: GitCli, remote_policy: RemoteMismatchPolicy) -> Self {
        Self { git, remote_policy }
    }

    /// バインディングとブランチの両方を保証する
    pub async fn sync(&self, remote_url: &RemoteUrl, branch: &BranchName) -> TidyResult<()> {
        self.ensure_binding(remote_url).await?;
        self.ensure_branch(branch).await
    }

    /// リポジトリを初期化し、`origin` が `remote_url` を指すようにする
    pub async fn ensure_binding(&self, remote_url: &RemoteUrl) -> TidyResult<()> {
        if !self.git.is_repository() {
            info!(dir = %self.git.work_dir().display(), "initializing git repository");
            self.git.init().await?;
        }

        let remotes = self.git.remotes().await?;
        if !remotes.iter().any(|name| name == ORIGIN) {
            info!(url = %remote_url, "adding remote origin");
            return self.git.add_remote(ORIGIN, remote_url.as_str()).await;
        }

        let current = self.git.remote_url(ORIGIN).await?;
        if remote_url.same_repository(&current) {
            debug!(url = %current, "origin already bound");
            return Ok(());
        }

        match self.remote_policy {
            RemoteMismatchPolicy::Update => {
                warn!(from = %current, to = %remote_url, "origin points elsewhere, updating");
                self.git.set_remote_url(ORIGIN, remote_url.as_str()).await
            }
            RemoteMismatchPolicy::Fail => Err(TidyError::validation_error(
                "remote_url",
                format!(
                    "origin points to '{}' but the configured remote is '{}'",
                    current, remote_url
                ),
                Some(current),
            )),
        }
    }

    /// リモートを取得し、`branch` をチェックアウトする
    ///
    /// ローカルに無ければ `origin/<branch>` を追跡して作り、それも無ければ新規に作る。
    /// コミットの無い直後のリポジトリでは作業ツリーをそのままに、ブランチをリモートに合わせる。
    pub async fn ensure_branch(&self, branch: &BranchName) -> TidyResult<()> {
        self.git.fetch(ORIGIN).await?;

        let name = branch.as_str();
        let current = self.git.current_branch().await?;
        if self.git.local_branch_exists(name).await? {
            if current.as_deref() == Some(name) {
                debug!(branch = name, "branch already checked out");
                return Ok(());
            }
            info!(branch = name, "checking out local branch");
            return self.git.checkout(name).await;
        }

        let tracking = branch.remote_tracking(ORIGIN);
        let remote_exists = self.git.remote_branch_exists(&tracking).await?;

        if !self.git.head_exists().await? {
            if current.as_deref() != Some(name) {
                self.git.set_head_branch(name).await?;
            }
            if remote_exists {
                info!(branch = name, tracking = %tracking, "basing unborn branch on origin");
                self.git.reset_to(&tracking).await?;
                self.git.set_upstream(name, &tracking).await?;
            } else {
                debug!(branch = name, "unborn branch, nothing to check out yet");
            }
            return Ok(());
        }

        if remote_exists {
            info!(branch = name, "creating branch tracking origin");
            self.git.checkout_tracking(name, &tracking).await
        } else {
            info!(branch = name, "creating new branch");
            self.git.checkout_new(name).await
        }
    }
}
