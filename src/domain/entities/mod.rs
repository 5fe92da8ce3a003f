pub mod archive_batch;
pub mod pipeline_config;
pub mod stage;
pub mod sync_outcome;
pub mod undo_ledger;
pub mod unwanted_list;
