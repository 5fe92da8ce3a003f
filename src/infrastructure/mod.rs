//! Infrastructure layer modules
//!
//! This layer provides concrete implementations for external system interactions:
//! - Process execution (the command runner every git call goes through)
//! - Git operations (remote binding, fetch, checkout, commit, push)
//! - File system operations (config files, file relocation, ledger persistence, locking)

pub mod filesystem;
pub mod git;
pub mod process;

// Re-export commonly used types
pub use filesystem::{ConfigStore, LedgerStore, LockFile};
pub use git::GitCli;
pub use process::{CommandOutput, CommandRunner, CommandRunnerError, ProcessCommandRunner};
