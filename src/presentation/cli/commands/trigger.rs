use anyhow::Result;
use std::sync::Arc;

use crate::application::use_cases::trigger_ci::TriggerCiUseCase;
use crate::domain::entities::pipeline_config::PipelineConfig;
use crate::infrastructure::process::CommandRunner;
use crate::presentation::ui::display::DisplayHelper;

/// Append a marker to the trigger file and publish it so CI runs again
pub struct TriggerCommand {
    pub config: PipelineConfig,
    pub message: Option<String>,
    runner: Arc<dyn CommandRunner>,
    use_color: bool,
}

impl TriggerCommand {
    pub fn new(
        config: PipelineConfig,
        message: Option<String>,
        runner: Arc<dyn CommandRunner>,
        use_color: bool,
    ) -> Self {
        Self {
            config,
            message,
            runner,
            use_color,
        }
    }

    /// Execute the trigger command
    pub async fn execute(&self) -> Result<()> {
        let display = DisplayHelper::new(self.use_color);
        let spinner = display.create_spinner("Publishing CI trigger...");

        let result = TriggerCiUseCase::new(self.config.clone(), Arc::clone(&self.runner))
            .execute(self.message.as_deref())
            .await;
        spinner.finish_and_clear();

        let report = result?;
        display.info(&format!(
            "Appended trigger marker to {}",
            display.format_path(&report.trigger_file)
        ));
        display.print_sync_outcome(&report.outcome);
        Ok(())
    }
}
