use anyhow::Result;

use crate::application::use_cases::restore_archive::RestoreArchiveUseCase;
use crate::domain::entities::pipeline_config::PipelineConfig;
use crate::presentation::ui::display::DisplayHelper;

/// Show the moves recorded in the pending undo ledger
pub struct LedgerCommand {
    pub config: PipelineConfig,
    pub json: bool,
    use_color: bool,
}

impl LedgerCommand {
    pub fn new(config: PipelineConfig, json: bool, use_color: bool) -> Self {
        Self {
            config,
            json,
            use_color,
        }
    }

    /// Execute the ledger command
    pub async fn execute(&self) -> Result<()> {
        let pending = RestoreArchiveUseCase::new(self.config.clone()).pending()?;

        if self.json {
            let records = pending.map(|ledger| ledger.into_records()).unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        let display = DisplayHelper::new(self.use_color);
        match pending {
            Some(ledger) if !ledger.is_empty() => display.print_ledger(&ledger, &self.config.base_dir),
            _ => display.info("No pending undo ledger"),
        }
        Ok(())
    }
}
