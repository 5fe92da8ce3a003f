use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::common::templates::{get_config_template, TemplateProcessor};
use crate::domain::entities::pipeline_config::PipelineConfig;
use crate::domain::value_objects::{branch_name::BranchName, remote_url::RemoteUrl};
use crate::infrastructure::filesystem::{ConfigStore, DEFAULT_CONFIG_FILE};
use crate::presentation::ui::display::DisplayHelper;

/// Initialize a new tidysync working tree
pub struct InitCommand {
    /// Directory where tidysync.yaml and the unwanted list are created
    pub target_dir: PathBuf,
    pub remote: Option<RemoteUrl>,
    pub branch: BranchName,
    /// Force overwrite existing file
    pub force: bool,
    use_color: bool,
}

impl InitCommand {
    pub fn new(
        target_dir: impl Into<PathBuf>,
        remote: Option<RemoteUrl>,
        branch: BranchName,
        force: bool,
        use_color: bool,
    ) -> Self {
        Self {
            target_dir: target_dir.into(),
            remote,
            branch,
            force,
            use_color,
        }
    }

    /// Render the sample configuration
    pub fn render_config(&self) -> String {
        let remote_url_entry = match &self.remote {
            Some(remote) => format!("remote_url: '{}'", remote.as_str()),
            None => "# remote_url: https://github.com/owner/repo.git".to_string(),
        };

        TemplateProcessor::new()
            .with_value("base_dir", ".")
            .with_value("remote_url_entry", remote_url_entry)
            .with_value("branch", self.branch.as_str())
            .process(get_config_template())
    }

    /// Execute the init command
    pub async fn execute(&self) -> Result<()> {
        let store = ConfigStore::new();
        let config_path = store.write_new_file(
            &self.target_dir.join(DEFAULT_CONFIG_FILE),
            &self.render_config(),
            self.force,
        )?;

        let list_path = PipelineConfig::new(&self.target_dir).unwanted_list_path();
        let created_list = self.write_unwanted_list(&store, &list_path)?;

        let display = DisplayHelper::new(self.use_color);
        display.success(&format!("Created {}", display.format_path(&config_path)));
        if created_list {
            display.success(&format!("Created {}", display.format_path(&list_path)));
        } else {
            display.info(&format!("Keeping existing {}", display.format_path(&list_path)));
        }

        display.section_header("Next steps");
        display.print_list(&[
            "List the files to archive in unwanted_files.txt, one path per line".to_string(),
            "Set remote_url in tidysync.yaml (or pass --remote)".to_string(),
            "Run 'tidysync run' to archive, generate CI, sync and publish".to_string(),
        ]);
        Ok(())
    }

    fn write_unwanted_list(&self, store: &ConfigStore, path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        store.write_new_file(path, "", false)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::TidyError;
    use std::fs;
    use tempfile::TempDir;

    fn command(dir: &Path, remote: Option<&str>, force: bool) -> InitCommand {
        InitCommand::new(
            dir,
            remote.map(|url| RemoteUrl::new(url).unwrap()),
            BranchName::new("main").unwrap(),
            force,
            false,
        )
    }

    #[tokio::test]
    async fn test_init_writes_loadable_config_and_empty_list() {
        let temp_dir = TempDir::new().unwrap();
        command(temp_dir.path(), Some("https://github.com/owner/repo.git"), false)
            .execute()
            .await
            .unwrap();

        let config = ConfigStore::new()
            .read_config(temp_dir.path().join(DEFAULT_CONFIG_FILE))
            .unwrap();
        assert_eq!(config.branch.as_str(), "main");
        assert_eq!(
            config.remote_url.as_ref().map(|url| url.as_str()),
            Some("https://github.com/owner/repo.git")
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("unwanted_files.txt")).unwrap(),
            ""
        );
    }

    #[tokio::test]
    async fn test_init_without_remote_leaves_it_commented() {
        let temp_dir = TempDir::new().unwrap();
        let rendered = command(temp_dir.path(), None, false).render_config();
        assert!(rendered.contains("# remote_url: https://github.com/owner/repo.git"));

        command(temp_dir.path(), None, false).execute().await.unwrap();
        let config = ConfigStore::new()
            .read_config(temp_dir.path().join(DEFAULT_CONFIG_FILE))
            .unwrap();
        assert!(config.remote_url.is_none());
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&config_path, "branch: keep\n").unwrap();
        fs::write(temp_dir.path().join("unwanted_files.txt"), "old.log\n").unwrap();

        let error = command(temp_dir.path(), None, false)
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<TidyError>(),
            Some(TidyError::ValidationError { .. })
        ));
        assert_eq!(fs::read_to_string(&config_path).unwrap(), "branch: keep\n");

        command(temp_dir.path(), None, true).execute().await.unwrap();
        assert!(fs::read_to_string(&config_path).unwrap().contains("branch: 'main'"));
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("unwanted_files.txt")).unwrap(),
            "old.log\n"
        );
    }
}
