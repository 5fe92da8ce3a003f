use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::common::result::{ResultExt, TidyResult};
use crate::common::templates::{get_ci_workflow_template, get_test_stub_template, TemplateProcessor};
use crate::domain::entities::pipeline_config::PipelineConfig;

/// GenerateCI ステージで CI 定義ファイルを書き出すコンポーネント
///
/// 書き出したファイルは Sync/Publish ステージより前に存在し、コミットに含まれる。
#[cfg_attr(test, mockall::automock)]
pub trait CiGenerator: Send + Sync {
    /// 生成したファイルのパスを返す
    fn generate(&self, config: &PipelineConfig) -> TidyResult<Vec<PathBuf>>;
}

/// `templates/ci.yml` から GitHub Actions のワークフローを生成する既定の実装
#[derive(Debug, Default, Clone)]
pub struct WorkflowTemplateGenerator;

impl WorkflowTemplateGenerator {
    pub fn new() -> Self {
        Self
    }

    fn render_workflow(&self, config: &PipelineConfig) -> String {
        TemplateProcessor::new()
            .with_value("branch", config.branch.as_str())
            .with_value("python_version", config.ci.python_version.as_str())
            .process(get_ci_workflow_template())
    }
}

impl CiGenerator for WorkflowTemplateGenerator {
    fn generate(&self, config: &PipelineConfig) -> TidyResult<Vec<PathBuf>> {
        let mut written = Vec::new();

        let workflow_path = config.resolve(&config.ci.workflow_path);
        write_file(&workflow_path, &self.render_workflow(config))?;
        info!(path = %workflow_path.display(), "workflow written");
        written.push(workflow_path);

        if config.ci.write_test_stub {
            let stub_path = config.resolve(&config.ci.test_stub_path);
            if stub_path.exists() {
                debug!(path = %stub_path.display(), "test stub exists, keeping it");
            } else {
                write_file(&stub_path, get_test_stub_template())?;
                info!(path = %stub_path.display(), "test stub written");
                written.push(stub_path);
            }
        }

        Ok(written)
    }
}

fn write_file(path: &std::path::Path, content: &str) -> TidyResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_filesystem_error("Failed to create directory", Some(parent.to_path_buf()))?;
    }
    fs::write(path, content).with_filesystem_error("Failed to write file", Some(path.to_path_buf()))
}
