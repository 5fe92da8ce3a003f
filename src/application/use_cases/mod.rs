pub mod restore_archive;
pub mod run_pipeline;
pub mod trigger_ci;

pub use restore_archive::RestoreArchiveUseCase;
pub use run_pipeline::{NoopObserver, PipelineObserver, PipelineReport, RunPipelineUseCase};
pub use trigger_ci::{TriggerCiUseCase, TriggerReport, DEFAULT_TRIGGER_MESSAGE};
