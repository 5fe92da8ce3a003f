use std::path::PathBuf;
use thiserror::Error;

use crate::domain::entities::stage::Stage;
use crate::domain::entities::sync_outcome::PublishStep;

#[derive(Error, Debug)]
pub enum TidyError {
    #[error("Config file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {field} - {message}")]
    ValidationError {
        field: String,
        message: String,
        value: Option<String>,
    },

    #[error("Path not found: {}", path.display())]
    PathNotFound { path: PathBuf },

    #[error("File system operation failed: {message}")]
    FileSystemError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("No undo ledger found at {}", path.display())]
    LedgerMissing { path: PathBuf },

    #[error("An unrestored undo ledger already exists at {} (run `tidysync undo` first or set ledger_policy: overwrite)", path.display())]
    LedgerPending { path: PathBuf },

    #[error("Another run holds the lock {} (remove it if no other run is active)", path.display())]
    LedgerLocked { path: PathBuf },

    #[error("Restore stopped after {restored} record(s); {remaining} record(s) remain in the ledger: {message}")]
    RestoreIncomplete {
        restored: usize,
        remaining: usize,
        message: String,
    },

    #[error("{operation} failed: `{command}` exited with {}: {diagnostic}", exit_code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    CommandError {
        operation: String,
        command: String,
        exit_code: Option<i32>,
        diagnostic: String,
    },

    #[error("Publish failed at {step}: {reason}")]
    PublishFailed {
        step: PublishStep,
        reason: String,
        local_commit: bool,
    },

    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<TidyError>,
    },

    #[error("Serialization error: {message}")]
    SerializationError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("`{command}` timed out after {timeout_secs} seconds")]
    Timeout { command: String, timeout_secs: u64 },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl TidyError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn validation_error(
        field: impl Into<String>,
        message: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
            value,
        }
    }

    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    pub fn filesystem_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn ledger_missing(path: impl Into<PathBuf>) -> Self {
        Self::LedgerMissing { path: path.into() }
    }

    pub fn ledger_pending(path: impl Into<PathBuf>) -> Self {
        Self::LedgerPending { path: path.into() }
    }

    pub fn ledger_locked(path: impl Into<PathBuf>) -> Self {
        Self::LedgerLocked { path: path.into() }
    }

    pub fn command_error(
        operation: impl Into<String>,
        command: impl Into<String>,
        exit_code: Option<i32>,
        diagnostic: impl Into<String>,
    ) -> Self {
        Self::CommandError {
            operation: operation.into(),
            command: command.into(),
            exit_code,
            diagnostic: diagnostic.into(),
        }
    }

    pub fn stage_failed(stage: Stage, source: TidyError) -> Self {
        Self::StageFailed {
            stage,
            source: Box::new(source),
        }
    }

    pub fn serialization_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn timeout(command: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout {
            command: command.into(),
            timeout_secs,
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            source: None,
        }
    }

    /// Innermost error, looking through `StageFailed` wrappers.
    pub fn root(&self) -> &TidyError {
        match self {
            Self::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// Name of the failed operation, used in structured fatal log lines.
    pub fn operation(&self) -> &str {
        match self.root() {
            Self::ConfigNotFound { .. } | Self::ConfigError { .. } => "load-config",
            Self::ValidationError { .. } => "validate",
            Self::PathNotFound { .. } | Self::FileSystemError { .. } => "filesystem",
            Self::LedgerMissing { .. }
            | Self::LedgerPending { .. }
            | Self::LedgerLocked { .. }
            | Self::RestoreIncomplete { .. } => "ledger",
            Self::CommandError { operation, .. } => operation.as_str(),
            Self::PublishFailed { step, .. } => step.as_str(),
            Self::SerializationError { .. } => "serialize",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled => "cancelled",
            Self::StageFailed { .. } | Self::InternalError { .. } => "internal",
        }
    }
}

impl From<std::io::Error> for TidyError {
    fn from(error: std::io::Error) -> Self {
        Self::filesystem_error_with_source("File system operation failed", None, error)
    }
}

impl From<serde_yaml::Error> for TidyError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialization_error_with_source("YAML serialization failed", error)
    }
}

impl From<serde_json::Error> for TidyError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization_error_with_source("JSON serialization failed", error)
    }
}

impl From<walkdir::Error> for TidyError {
    fn from(error: walkdir::Error) -> Self {
        let path = error.path().map(|p| p.to_path_buf());
        match error.into_io_error() {
            Some(io) => Self::filesystem_error_with_source("Directory walk failed", path, io),
            None => Self::filesystem_error("Directory walk failed (symlink loop)", path),
        }
    }
}
