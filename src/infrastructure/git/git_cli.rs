use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::common::error::TidyError;
use crate::common::result::TidyResult;
use crate::infrastructure::process::command_runner::{render_command, CommandOutput, CommandRunner};

/// Name of the single remote binding managed by tidysync
pub const ORIGIN: &str = "origin";

/// Typed git invocations over a [`CommandRunner`]
///
/// Every call runs `git` in the configured working directory. Non-zero exits of the
/// `*_checked` style helpers become [`TidyError::CommandError`] carrying the operation
/// name, the rendered command and git's diagnostic output.
#[derive(Clone)]
pub struct GitCli {
    runner: Arc<dyn CommandRunner>,
    work_dir: PathBuf,
}

const GIT: &str = "git";

impl GitCli {
    pub fn new(runner: Arc<dyn CommandRunner>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn argv(&self, args: &[&str]) -> Vec<String> {
        std::iter::once(GIT)
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    /// Execute a git command without checking its exit status
    pub async fn run(&self, args: &[&str]) -> TidyResult<CommandOutput> {
        let argv = self.argv(args);
        Ok(self.runner.run(&argv, &self.work_dir).await?)
    }

    /// Execute a git command and check for success, returning trimmed stdout
    pub async fn run_checked(&self, operation: &str, args: &[&str]) -> TidyResult<String> {
        let output = self.run(args).await?;
        if !output.success() {
            return Err(TidyError::command_error(
                operation,
                render_command(&self.argv(args)),
                Some(output.exit_code),
                output.diagnostic(),
            ));
        }
        Ok(output.stdout.trim().to_string())
    }

    /// Whether repository metadata exists in the working directory
    pub fn is_repository(&self) -> bool {
        self.work_dir.join(".git").exists()
    }

    pub async fn init(&self) -> TidyResult<()> {
        self.run_checked("init", &["init"]).await.map(drop)
    }

    /// Names of all configured remotes
    pub async fn remotes(&self) -> TidyResult<Vec<String>> {
        let stdout = self.run_checked("list-remotes", &["remote"]).await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub async fn remote_url(&self, name: &str) -> TidyResult<String> {
        self.run_checked("get-remote-url", &["remote", "get-url", name])
            .await
    }

    pub async fn add_remote(&self, name: &str, url: &str) -> TidyResult<()> {
        self.run_checked("add-remote", &["remote", "add", name, url])
            .await
            .map(drop)
    }

    pub async fn set_remote_url(&self, name: &str, url: &str) -> TidyResult<()> {
        self.run_checked("set-remote-url", &["remote", "set-url", name, url])
            .await
            .map(drop)
    }

    pub async fn fetch(&self, remote: &str) -> TidyResult<()> {
        self.run_checked("fetch", &["fetch", remote]).await.map(drop)
    }

    /// Branch HEAD points at, including an unborn branch; `None` when detached
    pub async fn current_branch(&self) -> TidyResult<Option<String>> {
        let output = self.run(&["symbolic-ref", "--short", "-q", "HEAD"]).await?;
        let name = output.stdout.trim();
        Ok((output.success() && !name.is_empty()).then(|| name.to_string()))
    }

    /// Whether `refs/heads/<branch>` exists; an unborn branch does not count
    pub async fn local_branch_exists(&self, branch: &str) -> TidyResult<bool> {
        let reference = format!("refs/heads/{}", branch);
        self.verify_ref("list-branches", &reference).await
    }

    /// Whether HEAD resolves to a commit; `false` in a freshly initialised repository
    pub async fn head_exists(&self) -> TidyResult<bool> {
        self.verify_ref("resolve-head", "HEAD").await
    }

    async fn verify_ref(&self, operation: &str, reference: &str) -> TidyResult<bool> {
        let args = ["rev-parse", "--verify", "-q", reference];
        let output = self.run(&args).await?;
        match output.exit_code {
            0 => Ok(true),
            // rev-parse --verify -q exits with 1 for a missing ref
            1 => Ok(false),
            code => Err(TidyError::command_error(
                operation,
                render_command(&self.argv(&args)),
                Some(code),
                output.diagnostic(),
            )),
        }
    }

    /// Whether the remote-tracking ref `tracking` (e.g. `origin/main`) exists
    pub async fn remote_branch_exists(&self, tracking: &str) -> TidyResult<bool> {
        let stdout = self
            .run_checked("list-remote-branches", &["branch", "-r", "--list", tracking])
            .await?;
        Ok(!stdout.is_empty())
    }

    pub async fn checkout(&self, branch: &str) -> TidyResult<()> {
        self.run_checked("checkout", &["checkout", branch])
            .await
            .map(drop)
    }

    /// Create `branch` tracking `tracking` and check it out
    pub async fn checkout_tracking(&self, branch: &str, tracking: &str) -> TidyResult<()> {
        self.run_checked("checkout", &["checkout", "-b", branch, "--track", tracking])
            .await
            .map(drop)
    }

    /// Create a fresh `branch` from the current HEAD and check it out
    pub async fn checkout_new(&self, branch: &str) -> TidyResult<()> {
        self.run_checked("checkout", &["checkout", "-b", branch])
            .await
            .map(drop)
    }

    /// Point an unborn HEAD at `branch` without touching the working tree
    pub async fn set_head_branch(&self, branch: &str) -> TidyResult<()> {
        let reference = format!("refs/heads/{}", branch);
        self.run_checked("checkout", &["symbolic-ref", "HEAD", &reference])
            .await
            .map(drop)
    }

    /// Move the current branch to `target`, keeping working tree files as they are
    pub async fn reset_to(&self, target: &str) -> TidyResult<()> {
        self.run_checked("reset", &["reset", "-q", target])
            .await
            .map(drop)
    }

    pub async fn set_upstream(&self, branch: &str, tracking: &str) -> TidyResult<()> {
        let upstream = format!("--set-upstream-to={}", tracking);
        self.run_checked("set-upstream", &["branch", &upstream, branch])
            .await
            .map(drop)
    }

    /// Read a config value; `None` when unset
    pub async fn config_get(&self, key: &str) -> TidyResult<Option<String>> {
        let output = self.run(&["config", "--get", key]).await?;
        match output.exit_code {
            0 => {
                let value = output.stdout.trim();
                Ok((!value.is_empty()).then(|| value.to_string()))
            }
            // git config exits with 1 when the key is not set
            1 => Ok(None),
            code => Err(TidyError::command_error(
                "read-config",
                render_command(&self.argv(&["config", "--get", key])),
                Some(code),
                output.diagnostic(),
            )),
        }
    }

    pub async fn config_set(&self, key: &str, value: &str) -> TidyResult<()> {
        self.run_checked("configure-identity", &["config", key, value])
            .await
            .map(drop)
    }

    pub async fn add_all(&self) -> TidyResult<()> {
        self.run_checked("stage", &["add", "-A"]).await.map(drop)
    }

    /// Porcelain status lines; empty when the working copy is clean
    pub async fn status_porcelain(&self) -> TidyResult<Vec<String>> {
        let stdout = self
            .run_checked("status", &["status", "--porcelain"])
            .await?;
        Ok(stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    pub async fn commit(&self, message: &str) -> TidyResult<()> {
        self.run_checked("commit", &["commit", "-m", message])
            .await
            .map(drop)
    }

    /// Push `branch` to `remote` with upstream tracking
    pub async fn push_upstream(&self, remote: &str, branch: &str) -> TidyResult<()> {
        self.run_checked("push", &["push", "-u", remote, branch])
            .await
            .map(drop)
    }
}

impl std::fmt::Debug for GitCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitCli")
            .field("work_dir", &self.work_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::process::command_runner::MockCommandRunner;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn git_with(mock: MockCommandRunner) -> GitCli {
        GitCli::new(Arc::new(mock), "/work")
    }

    #[tokio::test]
    async fn test_run_checked_returns_trimmed_stdout() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .withf(|argv, cwd| argv == args(&["git", "remote"]).as_slice() && cwd == Path::new("/work"))
            .times(1)
            .returning(|_, _| Ok(CommandOutput::ok("origin\nupstream\n")));

        let remotes = git_with(mock).remotes().await.unwrap();
        assert_eq!(remotes, vec!["origin".to_string(), "upstream".to_string()]);
    }

    #[tokio::test]
    async fn test_non_zero_exit_becomes_command_error() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .returning(|_, _| Ok(CommandOutput::failure(128, "fatal: could not read from remote\n")));

        let error = git_with(mock).fetch(ORIGIN).await.unwrap_err();
        match error {
            TidyError::CommandError {
                operation,
                command,
                exit_code,
                diagnostic,
            } => {
                assert_eq!(operation, "fetch");
                assert_eq!(command, "git fetch origin");
                assert_eq!(exit_code, Some(128));
                assert_eq!(diagnostic, "fatal: could not read from remote");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_config_get_unset_key_is_none() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .withf(|argv, _| argv == args(&["git", "config", "--get", "user.name"]).as_slice())
            .returning(|_, _| Ok(CommandOutput::failure(1, "")));

        let value = git_with(mock).config_get("user.name").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_current_branch_on_detached_head() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .returning(|_, _| Ok(CommandOutput::failure(1, "")));

        assert_eq!(git_with(mock).current_branch().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_checkout_tracking_arguments() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .withf(|argv, _| {
                argv == args(&["git", "checkout", "-b", "main", "--track", "origin/main"]).as_slice()
            })
            .times(1)
            .returning(|_, _| Ok(CommandOutput::ok("")));

        git_with(mock)
            .checkout_tracking("main", "origin/main")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_status_porcelain_skips_blank_lines() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .returning(|_, _| Ok(CommandOutput::ok(" M a.txt\n?? b.txt\n\n")));

        let status = git_with(mock).status_porcelain().await.unwrap();
        assert_eq!(status.len(), 2);
    }

    #[tokio::test]
    async fn test_unborn_branch_is_not_a_local_branch() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .withf(|argv, _| {
                argv == args(&["git", "rev-parse", "--verify", "-q", "refs/heads/master"]).as_slice()
            })
            .times(1)
            .returning(|_, _| Ok(CommandOutput::failure(1, "")));

        assert!(!git_with(mock).local_branch_exists("master").await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_ref_reports_unexpected_exit() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .returning(|_, _| Ok(CommandOutput::failure(128, "fatal: not a git repository")));

        let error = git_with(mock).head_exists().await.unwrap_err();
        assert_eq!(error.operation(), "resolve-head");
    }
}
