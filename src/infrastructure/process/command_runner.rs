use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::common::error::TidyError;

/// Command runner errors
#[derive(Debug, Error)]
pub enum CommandRunnerError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' timed out after {timeout_seconds} seconds")]
    Timeout {
        command: String,
        timeout_seconds: u64,
    },
}

impl From<CommandRunnerError> for TidyError {
    fn from(error: CommandRunnerError) -> Self {
        match error {
            CommandRunnerError::Timeout {
                command,
                timeout_seconds,
            } => TidyError::timeout(command, timeout_seconds),
            CommandRunnerError::SpawnFailed { command, source } => {
                TidyError::filesystem_error_with_source(
                    format!("Failed to spawn '{}'", command),
                    None,
                    source,
                )
            }
            CommandRunnerError::InvalidCommand(message) => TidyError::internal_error(message),
        }
    }
}

/// Captured result of one external command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code of the process (-1 when terminated by a signal)
    pub exit_code: i32,

    /// Standard output
    pub stdout: String,

    /// Standard error output
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::new(0, stdout, "")
    }

    /// Failed output with the given stderr
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::new(exit_code, "", stderr)
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Diagnostic text for error reports: stderr, or stdout when stderr is empty
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Executes an external process synchronously from the caller's point of view.
///
/// Implementations must not stream output; the whole stdout/stderr is returned once the
/// process exits. A non-zero exit is *not* an error at this level.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, argv: &[String], cwd: &Path) -> Result<CommandOutput, CommandRunnerError>;
}

/// Render an argv vector for logs and error messages
pub fn render_command(argv: &[String]) -> String {
    argv.join(" ")
}

/// Command runner backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct ProcessCommandRunner {
    /// Upper bound for a single command; `None` waits forever
    timeout: Option<Duration>,

    /// Environment variables set for every process
    environment_variables: HashMap<String, String>,
}

impl ProcessCommandRunner {
    /// Create a new runner without timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add environment variable
    pub fn with_environment_variable(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.environment_variables.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run(&self, argv: &[String], cwd: &Path) -> Result<CommandOutput, CommandRunnerError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| CommandRunnerError::InvalidCommand("Command is empty".to_string()))?;
        let command_line = render_command(argv);
        let start_time = Instant::now();

        let mut cmd = TokioCommand::new(program);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &self.environment_variables {
            cmd.env(key, value);
        }

        tracing::debug!(command = %command_line, cwd = %cwd.display(), "running command");

        // kill_on_drop terminates the child when the timeout drops the output future
        let output = match self.timeout {
            Some(limit) => match timeout(limit, cmd.output()).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(CommandRunnerError::Timeout {
                        command: command_line,
                        timeout_seconds: limit.as_secs(),
                    })
                }
            },
            None => cmd.output().await,
        }
        .map_err(|source| CommandRunnerError::SpawnFailed {
            command: command_line.clone(),
            source,
        })?;

        let result = CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(
            command = %command_line,
            exit_code = result.exit_code,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "command finished"
        );

        Ok(result)
    }
}
