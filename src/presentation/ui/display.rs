use colored::Colorize;
use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::use_cases::run_pipeline::{PipelineObserver, PipelineReport};
use crate::common::error::TidyError;
use crate::domain::entities::archive_batch::{ArchiveReport, SkipReason};
use crate::domain::entities::stage::Stage;
use crate::domain::entities::sync_outcome::SyncOutcome;
use crate::domain::entities::undo_ledger::{RestoreReport, UndoLedger};

/// Display utilities for the CLI interface
pub struct DisplayHelper {
    pub use_color: bool,
    pub terminal: Term,
}

impl DisplayHelper {
    /// Create a new DisplayHelper
    pub fn new(use_color: bool) -> Self {
        Self {
            use_color,
            terminal: Term::stdout(),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "✓".green().bold(), message);
        } else {
            println!("[SUCCESS] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "✗".red().bold(), message);
        } else {
            eprintln!("[ERROR] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "⚠".yellow().bold(), message);
        } else {
            println!("[WARNING] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "::".blue().bold(), message);
        } else {
            println!("[INFO] {}", message);
        }
    }

    /// Print a section header
    pub fn section_header(&self, title: &str) {
        if self.use_color {
            println!("\n{}", title.bold().underline());
        } else {
            println!("\n=== {} ===", title);
        }
    }

    /// Banner printed when a pipeline stage starts
    pub fn stage_banner(&self, stage: Stage) {
        let index = Stage::ALL.iter().position(|s| *s == stage).unwrap_or(0) + 1;
        let label = format!("[{}/{}] {}", index, Stage::ALL.len(), stage);
        if self.use_color {
            println!("\n{} {}", "==>".cyan().bold(), label.bold());
        } else {
            println!("\n==> {}", label);
        }
    }

    /// Format a file path with appropriate styling
    pub fn format_path(&self, path: &std::path::Path) -> String {
        let path = path.display().to_string();
        if self.use_color {
            path.cyan().to_string()
        } else {
            format!("'{}'", path)
        }
    }

    /// `path` relative to `base` when it lies inside it
    pub fn relative_path(&self, path: &std::path::Path, base: &std::path::Path) -> String {
        match pathdiff::diff_paths(path, base) {
            Some(relative) if !relative.starts_with("..") => relative.display().to_string(),
            _ => path.display().to_string(),
        }
    }

    /// Format a branch name with appropriate styling
    pub fn format_branch(&self, branch: &str) -> String {
        if self.use_color {
            branch.green().to_string()
        } else {
            format!("'{}'", branch)
        }
    }

    /// Create a spinner for indeterminate operations
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        let pb = if self.use_color && self.terminal.is_term() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
        };

        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈", "✓"])
            .template("{spinner:.green} {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    /// Print a list with bullets
    pub fn print_list(&self, items: &[String]) {
        for item in items {
            if self.use_color {
                println!("  {} {}", "•".blue(), item);
            } else {
                println!("  - {}", item);
            }
        }
    }

    /// Print a summary box
    pub fn print_summary(&self, title: &str, items: &[(String, String)]) {
        if self.use_color {
            println!("\n┌─ {} ─┐", title.bold());
            for (key, value) in items {
                println!("│ {}: {}", key.bold(), value);
            }
            println!("└{:─<width$}┘", "", width = title.len() + 4);
        } else {
            println!("\n=== {} ===", title);
            for (key, value) in items {
                println!("{}: {}", key, value);
            }
            println!("{}", "=".repeat(title.len() + 8));
        }
    }

    pub fn print_archive_report(&self, report: &ArchiveReport) {
        match &report.batch_root {
            Some(root) => self.success(&format!(
                "Archived {} path(s) into {}",
                report.moved_count(),
                self.format_path(root)
            )),
            None => self.info("Nothing was archived"),
        }

        let skipped: Vec<String> = report
            .skipped
            .iter()
            .map(|skip| format!("{} ({})", skip.entry, skip_reason_label(&skip.reason)))
            .collect();
        if !skipped.is_empty() {
            self.warning(&format!("Skipped {} entr(y/ies):", skipped.len()));
            self.print_list(&skipped);
        }

        for failure in &report.failed {
            self.error(&format!(
                "Could not move {}: {}",
                self.format_path(&failure.source),
                failure.error
            ));
        }

        if let Some(ledger) = &report.ledger_path {
            self.info(&format!("Undo ledger: {} (run `tidysync undo` to revert)", self.format_path(ledger)));
        }
    }

    pub fn print_sync_outcome(&self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::NothingToCommit => self.info("Working copy clean, nothing to commit"),
            SyncOutcome::CommittedAndPushed { branch, message } => self.success(&format!(
                "Committed \"{}\" and pushed to {}",
                message,
                self.format_branch(branch)
            )),
            SyncOutcome::Failed {
                step,
                reason,
                local_commit,
            } => {
                self.error(&format!("Publish failed at {}: {}", step, reason));
                if *local_commit {
                    self.warning("The commit exists locally; the local branch is ahead of origin");
                }
            }
        }
    }

    pub fn print_pipeline_summary(&self, report: &PipelineReport) {
        let mut items = vec![(
            "Stages".to_string(),
            report
                .completed
                .iter()
                .map(|stage| stage.to_string())
                .collect::<Vec<_>>()
                .join(" → "),
        )];
        if let Some(archive) = &report.archive {
            items.push((
                "Archived".to_string(),
                format!(
                    "{} moved, {} skipped, {} failed",
                    archive.moved_count(),
                    archive.skipped.len(),
                    archive.failed.len()
                ),
            ));
        }
        if report.completed.contains(&Stage::GenerateCi) {
            items.push(("CI files".to_string(), report.ci_files.len().to_string()));
        }
        if let Some(outcome) = &report.publish {
            items.push(("Publish".to_string(), outcome.to_string()));
        }
        self.print_summary("Summary", &items);
    }

    pub fn print_restore_report(&self, report: &RestoreReport) {
        self.success(&format!("Restored {} path(s)", report.restored));
        for warning in &report.warnings {
            self.warning(&format!(
                "{}: {}",
                self.format_path(&warning.record.original),
                warning.message
            ));
        }
    }

    pub fn print_ledger(&self, ledger: &UndoLedger, base_dir: &std::path::Path) {
        self.section_header(&format!("{} pending move(s)", ledger.len()));
        let rows: Vec<String> = ledger
            .records()
            .iter()
            .map(|record| {
                format!(
                    "{} ← {}",
                    self.relative_path(&record.original, base_dir),
                    self.relative_path(&record.archived, base_dir)
                )
            })
            .collect();
        self.print_list(&rows);
    }
}

fn skip_reason_label(reason: &SkipReason) -> &'static str {
    match reason {
        SkipReason::NotFound => "not found",
        SkipReason::OutsideBase => "outside base directory",
        SkipReason::Protected => "protected",
        SkipReason::Declined => "declined",
    }
}

/// Stage banners and a spinner while a stage runs
pub struct StageProgress {
    display: DisplayHelper,
    spinner: Mutex<Option<ProgressBar>>,
}

impl StageProgress {
    pub fn new(use_color: bool) -> Self {
        Self {
            display: DisplayHelper::new(use_color),
            spinner: Mutex::new(None),
        }
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|mut guard| guard.take())
    }
}

impl PipelineObserver for StageProgress {
    fn stage_started(&self, stage: Stage) {
        self.display.stage_banner(stage);
        let spinner = self.display.create_spinner(&format!("{}...", stage));
        if let Ok(mut guard) = self.spinner.lock() {
            *guard = Some(spinner);
        }
    }

    fn stage_finished(&self, stage: Stage, report: &PipelineReport) {
        if let Some(spinner) = self.take_spinner() {
            spinner.finish_and_clear();
        }
        match stage {
            Stage::Archive => {
                if let Some(archive) = &report.archive {
                    self.display.print_archive_report(archive);
                }
            }
            Stage::GenerateCi => {
                let files: Vec<String> = report
                    .ci_files
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect();
                self.display.success(&format!("Wrote {} CI file(s)", files.len()));
                self.display.print_list(&files);
            }
            Stage::Sync => self.display.success("Repository bound and branch checked out"),
            Stage::Publish => {
                if let Some(outcome) = &report.publish {
                    self.display.print_sync_outcome(outcome);
                }
            }
        }
    }

    fn stage_failed(&self, stage: Stage, error: &TidyError) {
        if let Some(spinner) = self.take_spinner() {
            spinner.abandon();
        }
        if let TidyError::PublishFailed { local_commit: true, .. } = error {
            self.display
                .warning("The commit exists locally; the local branch is ahead of origin");
        }
        self.display.error(&format!("Stage {} failed", stage));
    }
}

/// Helper functions for common display patterns
pub mod helpers {
    use super::*;

    /// Create a display helper with color detection
    pub fn auto_display(no_color: bool) -> DisplayHelper {
        let use_color =
            !no_color && atty::is(atty::Stream::Stdout) && std::env::var("NO_COLOR").is_err();
        DisplayHelper::new(use_color)
    }
}
