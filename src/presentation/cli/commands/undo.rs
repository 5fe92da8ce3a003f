use anyhow::Result;

use crate::application::use_cases::restore_archive::RestoreArchiveUseCase;
use crate::common::error::TidyError;
use crate::domain::entities::pipeline_config::PipelineConfig;
use crate::presentation::ui::display::DisplayHelper;

/// Move the files of the last archive batch back to where they came from
pub struct UndoCommand {
    pub config: PipelineConfig,
    use_color: bool,
}

impl UndoCommand {
    pub fn new(config: PipelineConfig, use_color: bool) -> Self {
        Self { config, use_color }
    }

    /// Execute the undo command
    pub async fn execute(&self) -> Result<()> {
        let display = DisplayHelper::new(self.use_color);
        let use_case = RestoreArchiveUseCase::new(self.config.clone());

        match use_case.execute().await {
            Ok(report) => {
                display.print_restore_report(&report);
                display.info(&format!(
                    "Removed undo ledger {}",
                    display.format_path(&report.ledger_path)
                ));
                Ok(())
            }
            Err(TidyError::LedgerMissing { path }) => {
                display.warning(&format!("No undo ledger found at {}", display.format_path(&path)));
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
