//! Mock services for testing
//!
//! `FakeGitRunner` stands in for the git binary. It keeps a small in-memory model of a
//! repository (remotes, branches, config, the last committed snapshot of the working
//! tree) so that whole pipeline runs can be exercised without a network or a real git.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tidysync::infrastructure::process::{CommandOutput, CommandRunner, CommandRunnerError};
use walkdir::WalkDir;

#[derive(Debug, Default)]
struct FakeGitState {
    initialized: bool,
    remotes: BTreeMap<String, String>,
    local_branches: BTreeSet<String>,
    remote_branches: BTreeSet<String>,
    current: Option<String>,
    upstreams: HashMap<String, String>,
    config: HashMap<String, String>,
    committed: BTreeMap<String, Vec<u8>>,
    commits: Vec<String>,
    pushes: Vec<(String, String)>,
    failures: HashMap<String, (i32, String)>,
    calls: Vec<Vec<String>>,
}

/// Stateful stand-in for `git`, recording every invocation
#[derive(Debug, Clone, Default)]
pub struct FakeGitRunner {
    state: Arc<Mutex<FakeGitState>>,
}

impl FakeGitRunner {
    /// Create a runner with no repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `dir` already is a repository on `branch` with a clean, committed tree
    pub fn with_repository(self, dir: &Path, branch: &str) -> Self {
        fs::create_dir_all(dir.join(".git")).unwrap();
        {
            let mut state = self.state.lock().unwrap();
            state.initialized = true;
            state.local_branches.insert(branch.to_string());
            state.current = Some(branch.to_string());
            state.committed = snapshot(dir);
        }
        self
    }

    /// Configure a remote
    pub fn with_remote(self, name: &str, url: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .remotes
            .insert(name.to_string(), url.to_string());
        self
    }

    /// Pretend `origin/<branch>` exists
    pub fn with_remote_branch(self, branch: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .remote_branches
            .insert(branch.to_string());
        self
    }

    /// Set a git config value
    pub fn with_config(self, key: &str, value: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .config
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Make every `git <subcommand>` call fail
    pub fn fail_on(self, subcommand: &str, exit_code: i32, stderr: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(subcommand.to_string(), (exit_code, stderr.to_string()));
        self
    }

    /// Stop failing `git <subcommand>`
    pub fn clear_failure(&self, subcommand: &str) {
        self.state.lock().unwrap().failures.remove(subcommand);
    }

    /// Get call history for verification, rendered as command lines
    pub fn calls(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|argv| argv.join(" "))
            .collect()
    }

    /// Calls whose rendered command line starts with `prefix`
    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(prefix))
            .collect()
    }

    pub fn remotes(&self) -> BTreeMap<String, String> {
        self.state.lock().unwrap().remotes.clone()
    }

    pub fn current_branch(&self) -> Option<String> {
        self.state.lock().unwrap().current.clone()
    }

    /// Upstream configured for a local branch
    pub fn upstream(&self, branch: &str) -> Option<String> {
        self.state.lock().unwrap().upstreams.get(branch).cloned()
    }

    pub fn commits(&self) -> Vec<String> {
        self.state.lock().unwrap().commits.clone()
    }

    pub fn pushes(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().pushes.clone()
    }

    pub fn config_value(&self, key: &str) -> Option<String> {
        self.state.lock().unwrap().config.get(key).cloned()
    }

    fn execute(state: &mut FakeGitState, args: &[&str], cwd: &Path) -> CommandOutput {
        match args {
            ["init"] => {
                fs::create_dir_all(cwd.join(".git")).unwrap();
                state.initialized = true;
                state.current = Some("master".to_string());
                CommandOutput::ok("Initialized empty Git repository\n")
            }
            _ if !state.initialized => {
                CommandOutput::failure(128, "fatal: not a git repository")
            }
            ["remote"] => CommandOutput::ok(
                state
                    .remotes
                    .keys()
                    .map(|name| format!("{}\n", name))
                    .collect::<String>(),
            ),
            ["remote", "get-url", name] => match state.remotes.get(*name) {
                Some(url) => CommandOutput::ok(format!("{}\n", url)),
                None => CommandOutput::failure(2, format!("error: No such remote '{}'", name)),
            },
            ["remote", "add", name, url] => {
                if state.remotes.contains_key(*name) {
                    return CommandOutput::failure(3, format!("error: remote {} already exists.", name));
                }
                state.remotes.insert(name.to_string(), url.to_string());
                CommandOutput::ok("")
            }
            ["remote", "set-url", name, url] => match state.remotes.get_mut(*name) {
                Some(current) => {
                    *current = url.to_string();
                    CommandOutput::ok("")
                }
                None => CommandOutput::failure(2, format!("error: No such remote '{}'", name)),
            },
            ["fetch", remote] => {
                if state.remotes.contains_key(*remote) {
                    CommandOutput::ok("")
                } else {
                    CommandOutput::failure(
                        128,
                        format!("fatal: '{}' does not appear to be a git repository", remote),
                    )
                }
            }
            ["symbolic-ref", "--short", "-q", "HEAD"] => match &state.current {
                Some(branch) => CommandOutput::ok(format!("{}\n", branch)),
                None => CommandOutput::failure(1, ""),
            },
            ["rev-parse", "--verify", "-q", reference] => {
                let exists = match *reference {
                    "HEAD" => state
                        .current
                        .as_ref()
                        .map_or(false, |branch| state.local_branches.contains(branch)),
                    other => other
                        .strip_prefix("refs/heads/")
                        .map_or(false, |branch| state.local_branches.contains(branch)),
                };
                if exists {
                    CommandOutput::ok("0123456789abcdef\n")
                } else {
                    CommandOutput::failure(1, "")
                }
            }
            ["symbolic-ref", "HEAD", reference] => match reference.strip_prefix("refs/heads/") {
                Some(branch) => {
                    state.current = Some(branch.to_string());
                    CommandOutput::ok("")
                }
                None => CommandOutput::failure(128, format!("fatal: Refusing to point HEAD outside of refs/heads/: {}", reference)),
            },
            ["reset", "-q", target] => {
                let exists = target
                    .strip_prefix("origin/")
                    .map_or(false, |branch| state.remote_branches.contains(branch));
                match (&state.current, exists) {
                    (Some(branch), true) => {
                        let branch = branch.clone();
                        state.local_branches.insert(branch);
                        CommandOutput::ok("")
                    }
                    _ => CommandOutput::failure(128, format!("fatal: ambiguous argument '{}'", target)),
                }
            }
            ["branch", upstream, branch] if upstream.starts_with("--set-upstream-to=") => {
                if !state.local_branches.contains(*branch) {
                    return CommandOutput::failure(128, format!("fatal: branch '{}' does not exist", branch));
                }
                let tracking = upstream.trim_start_matches("--set-upstream-to=");
                state.upstreams.insert(branch.to_string(), tracking.to_string());
                CommandOutput::ok("")
            }
            ["branch", "-r", "--list", tracking] => {
                let exists = tracking
                    .strip_prefix("origin/")
                    .map_or(false, |branch| state.remote_branches.contains(branch));
                if exists {
                    CommandOutput::ok(format!("  {}\n", tracking))
                } else {
                    CommandOutput::ok("")
                }
            }
            ["checkout", "-b", branch, "--track", _] | ["checkout", "-b", branch] => {
                if state.local_branches.contains(*branch) {
                    return CommandOutput::failure(
                        128,
                        format!("fatal: a branch named '{}' already exists", branch),
                    );
                }
                state.local_branches.insert(branch.to_string());
                state.current = Some(branch.to_string());
                if let ["checkout", "-b", branch, "--track", tracking] = args {
                    state.upstreams.insert(branch.to_string(), tracking.to_string());
                }
                CommandOutput::ok("")
            }
            ["checkout", branch] => {
                if state.local_branches.contains(*branch) {
                    state.current = Some(branch.to_string());
                    CommandOutput::ok("")
                } else {
                    CommandOutput::failure(
                        1,
                        format!("error: pathspec '{}' did not match any file(s) known to git", branch),
                    )
                }
            }
            ["config", "--get", key] => match state.config.get(*key) {
                Some(value) => CommandOutput::ok(format!("{}\n", value)),
                None => CommandOutput::failure(1, ""),
            },
            ["config", key, value] => {
                state.config.insert(key.to_string(), value.to_string());
                CommandOutput::ok("")
            }
            ["add", "-A"] => CommandOutput::ok(""),
            ["status", "--porcelain"] => CommandOutput::ok(porcelain(&state.committed, &snapshot(cwd))),
            ["commit", "-m", message] => {
                let current = snapshot(cwd);
                if porcelain(&state.committed, &current).is_empty() {
                    return CommandOutput::new(1, "nothing to commit, working tree clean\n", "");
                }
                state.committed = current;
                state.commits.push(message.to_string());
                if let Some(branch) = &state.current {
                    state.local_branches.insert(branch.clone());
                }
                CommandOutput::ok("")
            }
            ["push", "-u", remote, branch] => {
                if !state.remotes.contains_key(*remote) {
                    return CommandOutput::failure(
                        128,
                        format!("fatal: '{}' does not appear to be a git repository", remote),
                    );
                }
                state.remote_branches.insert(branch.to_string());
                state.pushes.push((remote.to_string(), branch.to_string()));
                CommandOutput::ok("")
            }
            other => CommandOutput::failure(
                129,
                format!("fake git: unsupported invocation {:?}", other),
            ),
        }
    }
}

#[async_trait]
impl CommandRunner for FakeGitRunner {
    async fn run(&self, argv: &[String], cwd: &Path) -> Result<CommandOutput, CommandRunnerError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(argv.to_vec());

        let args: Vec<&str> = argv.iter().skip(1).map(String::as_str).collect();
        if let Some((exit_code, stderr)) = args
            .first()
            .and_then(|subcommand| state.failures.get(*subcommand))
        {
            return Ok(CommandOutput::failure(*exit_code, stderr.clone()));
        }

        Ok(Self::execute(&mut state, &args, cwd))
    }
}

/// File contents under `dir`, keyed by relative path, excluding `.git`
fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(dir).ok()?.to_string_lossy().to_string();
            let content = fs::read(entry.path()).ok()?;
            Some((relative, content))
        })
        .collect()
}

fn porcelain(committed: &BTreeMap<String, Vec<u8>>, current: &BTreeMap<String, Vec<u8>>) -> String {
    let mut lines = String::new();
    for (path, content) in current {
        match committed.get(path) {
            None => lines.push_str(&format!("?? {}\n", path)),
            Some(previous) if previous != content => lines.push_str(&format!(" M {}\n", path)),
            Some(_) => {}
        }
    }
    for path in committed.keys().filter(|path| !current.contains_key(*path)) {
        lines.push_str(&format!(" D {}\n", path));
    }
    lines
}
