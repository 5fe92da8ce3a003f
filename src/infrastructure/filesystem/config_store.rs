use std::fs;
use std::path::{Path, PathBuf};

use crate::common::error::TidyError;
use crate::common::result::{ResultExt, TidyResult};
use crate::domain::entities::pipeline_config::PipelineConfig;
use crate::domain::entities::unwanted_list::UnwantedFileList;

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "tidysync.yaml";

/// Configuration store for tidysync.yaml and the unwanted file list
#[derive(Debug, Clone)]
pub struct ConfigStore {
    /// Whether to validate configuration on read
    validate_on_read: bool,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Create a new configuration store with default settings
    pub fn new() -> Self {
        Self {
            validate_on_read: true,
        }
    }

    /// Disable validation on read (validation then happens after overrides are applied)
    pub fn without_validation(mut self) -> Self {
        self.validate_on_read = false;
        self
    }

    /// Read pipeline configuration from a YAML file
    ///
    /// A relative `base_dir` is resolved against the directory containing the file.
    pub fn read_config<P: AsRef<Path>>(&self, config_path: P) -> TidyResult<PipelineConfig> {
        let config_path = config_path.as_ref();

        if !config_path.exists() {
            return Err(TidyError::config_not_found(config_path));
        }

        let content = fs::read_to_string(config_path).with_filesystem_error(
            "Failed to read configuration file",
            Some(config_path.to_path_buf()),
        )?;

        let mut config: PipelineConfig = serde_yaml::from_str(&content).map_err(|e| {
            TidyError::config_error_with_source(
                format!("Invalid configuration file {}", config_path.display()),
                e,
            )
        })?;

        if config.base_dir.is_relative() {
            let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
            config.base_dir = config_dir.join(&config.base_dir);
        }

        if self.validate_on_read {
            config.validate_all()?;
        }

        tracing::debug!(path = %config_path.display(), base_dir = %config.base_dir.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration for a CLI invocation
    ///
    /// An explicitly requested file must exist. Without one, `tidysync.yaml` in
    /// `search_dir` is used when present; otherwise defaults rooted at `search_dir`.
    pub fn load(&self, explicit: Option<&Path>, search_dir: &Path) -> TidyResult<PipelineConfig> {
        if let Some(path) = explicit {
            return self.read_config(path);
        }

        let default_path = search_dir.join(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return self.read_config(default_path);
        }

        tracing::debug!(dir = %search_dir.display(), "no configuration file, using defaults");
        Ok(PipelineConfig::new(search_dir))
    }

    /// Read the unwanted file list configured for `config`
    pub fn read_unwanted_list(&self, config: &PipelineConfig) -> TidyResult<UnwantedFileList> {
        let path = config.unwanted_list_path();
        if !path.exists() {
            return Err(TidyError::config_not_found(path));
        }
        let content = fs::read_to_string(&path)
            .with_filesystem_error("Failed to read unwanted file list", Some(path.clone()))?;
        Ok(UnwantedFileList::parse(&content))
    }

    /// Write a new file, refusing to replace an existing one unless `force` is set
    pub fn write_new_file(&self, path: &Path, content: &str, force: bool) -> TidyResult<PathBuf> {
        if path.exists() && !force {
            return Err(TidyError::validation_error(
                "path",
                format!("{} already exists (use --force to overwrite)", path.display()),
                Some(path.display().to_string()),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_filesystem_error(
                "Failed to create directory",
                Some(parent.to_path_buf()),
            )?;
        }
        fs::write(path, content)
            .with_filesystem_error("Failed to write file", Some(path.to_path_buf()))?;
        Ok(path.to_path_buf())
    }
}
