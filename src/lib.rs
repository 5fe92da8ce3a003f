//! # tidysync - Working tree cleanup and CI publishing pipeline
//!
//! `tidysync` prepares a project working tree for continuous integration and publishes it
//! to a git remote. A run is a fixed sequence of stages:
//!
//! 1. **Archive**: move the files named in an unwanted list into a timestamped archive
//!    directory and record every move in an undo ledger.
//! 2. **GenerateCI**: write a GitHub Actions workflow and a placeholder test.
//! 3. **Sync**: bind the working tree to the configured remote and check out the branch.
//! 4. **Publish**: stage, commit and push all changes.
//!
//! Each stage is fail-fast; the first failure stops the run. The last archive pass can be
//! reverted with `tidysync undo` as long as its ledger exists.
//!
//! ## Quick Start
//!
//! 1. Create a configuration and an empty unwanted list:
//!
//! ```bash
//! tidysync init --remote https://github.com/owner/repo.git --branch main
//! ```
//!
//! 2. List the files to archive, one path per line, in `unwanted_files.txt`:
//!
//! ```text
//! old_notes.txt
//! scratch/experiment.py
//! ```
//!
//! 3. Run the whole pipeline, or only some stages:
//!
//! ```bash
//! tidysync run
//! tidysync run --archive --generate-ci
//! ```
//!
//! ## Architecture
//!
//! The crate is organized using clean architecture principles:
//!
//! - [`domain`]: Configuration, archive/ledger records and value objects
//! - [`application`]: Archive engine, undo ledger, synchronizer, publisher and use cases
//! - [`infrastructure`]: Process execution, git invocations and file system access
//! - [`presentation`]: CLI interface and terminal output
//! - [`common`]: Shared utilities and error handling
//!
//! ## Domain Model
//!
//! - [`domain::entities::pipeline_config::PipelineConfig`]: Explicit configuration passed to every component
//! - [`domain::entities::unwanted_list::UnwantedFileList`]: Entries naming files to archive
//! - [`domain::entities::archive_batch::MoveRecord`]: One original/archived path pair
//! - [`domain::entities::undo_ledger::UndoLedger`]: The moves of the last archive pass
//! - [`domain::entities::sync_outcome::SyncOutcome`]: Result of the publish step
//! - [`domain::value_objects::branch_name::BranchName`]: Validated git branch name
//! - [`domain::value_objects::remote_url::RemoteUrl`]: Validated remote repository location
//!
//! ## Use Cases
//!
//! - [`application::use_cases::run_pipeline`]: Run the selected stages in order
//! - [`application::use_cases::restore_archive`]: Revert the last archive pass
//! - [`application::use_cases::trigger_ci`]: Append a trigger marker and publish it
//!
//! ## Error Handling
//!
//! - [`common::error::TidyError`]: Main error type with detailed context
//! - [`common::result::TidyResult`]: Type alias for `Result<T, TidyError>`
//!
//! ## Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tidysync::application::use_cases::run_pipeline::RunPipelineUseCase;
//! use tidysync::domain::entities::pipeline_config::PipelineConfig;
//! use tidysync::domain::entities::stage::{Stage, StageSelection};
//! use tidysync::infrastructure::process::ProcessCommandRunner;
//!
//! # async fn example() -> tidysync::Result<()> {
//! let config = PipelineConfig::new("/path/to/project");
//! let use_case = RunPipelineUseCase::new(config, Arc::new(ProcessCommandRunner::new()));
//!
//! let report = use_case
//!     .execute(&StageSelection::from_stages([Stage::Archive, Stage::GenerateCi]))
//!     .await?;
//! if let Some(archive) = report.archive {
//!     println!("Archived {} file(s)", archive.moved_count());
//! }
//! # Ok(())
//! # }
//! ```

// Documentation attributes
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::TidyError;
pub use crate::common::result::TidyResult as Result;
