pub mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::env;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Arc;

use crate::common::error::TidyError;
use crate::common::logging::{init_logging, LogFormat};
use crate::common::result::{ResultExt, TidyResult};
use crate::domain::entities::pipeline_config::{MatchMode, PipelineConfig};
use crate::domain::entities::stage::Stage;
use crate::domain::value_objects::{branch_name::BranchName, remote_url::RemoteUrl};
use crate::infrastructure::filesystem::ConfigStore;
use crate::infrastructure::process::{CommandRunner, ProcessCommandRunner};
use crate::presentation::cli::commands::{
    InitCommand, LedgerCommand, RunCommand, RunOptions, TriggerCommand, UndoCommand,
};
use crate::presentation::ui::display::helpers::auto_display;

/// tidysync - Archive unwanted files, generate CI and publish to a git remote
#[derive(Parser, Debug)]
#[command(name = "tidysync")]
#[command(about = "Archive unwanted files, generate CI workflow files and publish to a git remote")]
#[command(version)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_DATE"),
    ")"
))]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Working directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (defaults to tidysync.yaml in the working directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Base directory of the working tree
    #[arg(long, global = true, env = "TIDYSYNC_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    /// Remote repository URL
    #[arg(long, global = true, env = "TIDYSYNC_REMOTE")]
    pub remote: Option<String>,

    /// Branch to sync and push
    #[arg(long, global = true, env = "TIDYSYNC_BRANCH")]
    pub branch: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline (all stages unless some are selected)
    Run {
        /// Archive the files listed in the unwanted list
        #[arg(long)]
        archive: bool,

        /// Generate the CI workflow and test stub
        #[arg(long)]
        generate_ci: bool,

        /// Bind the remote and check out the branch
        #[arg(long)]
        sync: bool,

        /// Commit and push all changes
        #[arg(long)]
        publish: bool,

        /// How unwanted list entries are located
        #[arg(long, value_enum)]
        match_mode: Option<MatchMode>,

        /// Stop archiving at the first failed move
        #[arg(long)]
        abort_on_error: bool,

        /// Replace an unrestored undo ledger instead of refusing to archive
        #[arg(long)]
        overwrite_ledger: bool,

        /// Commit message ({{timestamp}} and {{branch}} are replaced)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Restore the files moved by the last archive pass
    Undo,

    /// Show the pending undo ledger
    Ledger {
        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create tidysync.yaml and an empty unwanted list
    Init {
        /// Force overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Append a marker to the trigger file and publish it
    Trigger {
        /// Commit message ({{timestamp}} and {{branch}} are replaced)
        #[arg(short, long)]
        message: Option<String>,
    },
}

impl Commands {
    fn selected_stages(archive: bool, generate_ci: bool, sync: bool, publish: bool) -> Vec<Stage> {
        [
            (archive, Stage::Archive),
            (generate_ci, Stage::GenerateCi),
            (sync, Stage::Sync),
            (publish, Stage::Publish),
        ]
        .into_iter()
        .filter_map(|(selected, stage)| selected.then_some(stage))
        .collect()
    }
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let display = auto_display(self.cli.no_color);
        colored::control::set_override(display.use_color);

        init_logging(self.cli.verbose, self.cli.log_format);

        // Change directory if specified
        if let Some(ref dir) = self.cli.directory {
            env::set_current_dir(dir)?;
        }

        let result = tokio::select! {
            result = self.handle_command(display.use_color) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("interrupted, cancelling");
                Err(TidyError::Cancelled.into())
            }
        };

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    async fn handle_command(&self, use_color: bool) -> anyhow::Result<()> {
        match &self.cli.command {
            Commands::Run {
                archive,
                generate_ci,
                sync,
                publish,
                match_mode,
                abort_on_error,
                overwrite_ledger,
                message,
            } => {
                let options = RunOptions {
                    stages: Commands::selected_stages(*archive, *generate_ci, *sync, *publish),
                    match_mode: *match_mode,
                    abort_on_error: *abort_on_error,
                    overwrite_ledger: *overwrite_ledger,
                    message: message.clone(),
                };
                let config = self.load_config()?;
                let runner = self.command_runner(&config);
                RunCommand::new(config, options, runner, use_color)
                    .execute()
                    .await
            }
            Commands::Undo => {
                UndoCommand::new(self.load_config()?, use_color)
                    .execute()
                    .await
            }
            Commands::Ledger { json } => {
                LedgerCommand::new(self.load_config()?, *json, use_color)
                    .execute()
                    .await
            }
            Commands::Init { force } => self.handle_init_command(*force, use_color).await,
            Commands::Trigger { message } => {
                let config = self.load_config()?;
                let runner = self.command_runner(&config);
                TriggerCommand::new(config, message.clone(), runner, use_color)
                    .execute()
                    .await
            }
        }
    }

    async fn handle_init_command(&self, force: bool, use_color: bool) -> anyhow::Result<()> {
        let current_dir = env::current_dir()?;
        let target_dir = self
            .cli
            .base_dir
            .as_deref()
            .map(|dir| absolutize(&current_dir, dir))
            .unwrap_or(current_dir);
        let branch = match &self.cli.branch {
            Some(branch) => parse_branch(branch)?,
            None => BranchName::default(),
        };
        let remote = self.cli.remote.as_deref().map(parse_remote).transpose()?;

        InitCommand::new(target_dir, remote, branch, force, use_color)
            .execute()
            .await
    }

    /// Load the configuration file and apply CLI/env overrides
    fn load_config(&self) -> TidyResult<PipelineConfig> {
        let current_dir = env::current_dir()?;
        let mut config = ConfigStore::new()
            .without_validation()
            .load(self.cli.config.as_deref(), &current_dir)?;

        if let Some(base_dir) = &self.cli.base_dir {
            config.base_dir = absolutize(&current_dir, base_dir);
        }
        if let Some(remote) = &self.cli.remote {
            config = config.with_remote_url(parse_remote(remote)?);
        }
        if let Some(branch) = &self.cli.branch {
            config = config.with_branch(parse_branch(branch)?);
        }
        config.validate_all()?;

        tracing::debug!(
            base_dir = %config.base_dir.display(),
            branch = config.branch.as_str(),
            "configuration resolved"
        );
        Ok(config)
    }

    fn command_runner(&self, config: &PipelineConfig) -> Arc<dyn CommandRunner> {
        Arc::new(
            ProcessCommandRunner::new()
                .with_timeout(config.command_timeout())
                .with_environment_variable("GIT_TERMINAL_PROMPT", "0"),
        )
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

fn absolutize(current_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        current_dir.join(path)
    }
}

fn parse_branch(branch: &str) -> TidyResult<BranchName> {
    BranchName::new(branch)
        .map_tidy_err(|e| TidyError::validation_error("branch", e.to_string(), Some(branch.to_string())))
}

fn parse_remote(remote: &str) -> TidyResult<RemoteUrl> {
    RemoteUrl::new(remote)
        .map_tidy_err(|e| TidyError::validation_error("remote", e.to_string(), Some(remote.to_string())))
}
