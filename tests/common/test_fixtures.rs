//! Test fixtures for creating test data
//!
//! `ProjectFixture` builds a throwaway working tree with files, an unwanted list and a
//! `PipelineConfig` rooted at it.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tidysync::domain::entities::pipeline_config::PipelineConfig;
use tidysync::domain::value_objects::{branch_name::BranchName, remote_url::RemoteUrl};

pub const REMOTE_URL: &str = "https://github.com/example/project.git";

/// Temporary project directory
pub struct ProjectFixture {
    temp_dir: TempDir,
}

impl ProjectFixture {
    /// Create an empty project
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// A small Python-ish project with some clutter
    pub fn with_clutter() -> Self {
        let fixture = Self::new();
        fixture.write("main.py", "print('hello')\n");
        fixture.write("README.md", "# Project\n");
        fixture.write("old_notes.txt", "remember the milk\n");
        fixture.write("scratch/experiment.py", "x = 1\n");
        fixture.write("scratch/keep.py", "y = 2\n");
        fixture
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a file, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    /// Write `unwanted_files.txt` with one entry per line
    pub fn unwanted(&self, entries: &[&str]) -> PathBuf {
        let mut content = entries.join("\n");
        content.push('\n');
        self.write("unwanted_files.txt", &content)
    }

    /// Default configuration rooted at the project
    pub fn config(&self) -> PipelineConfig {
        PipelineConfig::new(self.root())
    }

    /// Configuration with a remote and branch, as needed by sync and publish
    pub fn remote_config(&self, branch: &str) -> PipelineConfig {
        self.config()
            .with_remote_url(RemoteUrl::new(REMOTE_URL).unwrap())
            .with_branch(BranchName::new(branch).unwrap())
    }

    /// Directories directly under the root whose name starts with `prefix`
    pub fn dirs_with_prefix(&self, prefix: &str) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = fs::read_dir(self.root())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(prefix))
            .map(|entry| entry.path())
            .collect();
        dirs.sort();
        dirs
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
