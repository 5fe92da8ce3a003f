use anyhow::Result;
use std::sync::Arc;

use crate::application::use_cases::run_pipeline::RunPipelineUseCase;
use crate::domain::entities::pipeline_config::{
    FailurePolicy, LedgerPolicy, MatchMode, PipelineConfig,
};
use crate::domain::entities::stage::{Stage, StageSelection};
use crate::infrastructure::process::CommandRunner;
use crate::presentation::ui::display::{DisplayHelper, StageProgress};

/// Per-invocation overrides accepted by `tidysync run`
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub stages: Vec<Stage>,
    pub match_mode: Option<MatchMode>,
    pub abort_on_error: bool,
    pub overwrite_ledger: bool,
    pub message: Option<String>,
}

impl RunOptions {
    fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(match_mode) = self.match_mode {
            config = config.with_match_mode(match_mode);
        }
        if self.abort_on_error {
            config = config.with_failure_policy(FailurePolicy::Abort);
        }
        if self.overwrite_ledger {
            config = config.with_ledger_policy(LedgerPolicy::Overwrite);
        }
        if let Some(message) = &self.message {
            config = config.with_commit_message(message.clone());
        }
        config
    }
}

/// Run the selected pipeline stages
pub struct RunCommand {
    pub config: PipelineConfig,
    pub options: RunOptions,
    runner: Arc<dyn CommandRunner>,
    use_color: bool,
}

impl RunCommand {
    pub fn new(
        config: PipelineConfig,
        options: RunOptions,
        runner: Arc<dyn CommandRunner>,
        use_color: bool,
    ) -> Self {
        Self {
            config,
            options,
            runner,
            use_color,
        }
    }

    /// Execute the run command
    pub async fn execute(&self) -> Result<()> {
        let config = self.options.apply(self.config.clone());
        let selection = StageSelection::from_stages(self.options.stages.iter().copied());

        let display = DisplayHelper::new(self.use_color);
        display.info(&format!(
            "Running {} in {}",
            selection
                .ordered()
                .iter()
                .map(|stage| stage.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            display.format_path(&config.base_dir)
        ));

        let use_case = RunPipelineUseCase::new(config, Arc::clone(&self.runner))
            .with_observer(Arc::new(StageProgress::new(self.use_color)));
        let report = use_case.execute(&selection).await?;

        display.print_pipeline_summary(&report);
        display.success("Pipeline completed");
        Ok(())
    }
}
