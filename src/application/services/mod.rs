pub mod archive_engine;
pub mod ci_generator;
pub mod publisher;
pub mod repository_synchronizer;
pub mod undo_ledger;

pub use archive_engine::{ArchiveEngine, ConfirmFn};
pub use ci_generator::{CiGenerator, WorkflowTemplateGenerator};
pub use publisher::Publisher;
pub use repository_synchronizer::RepositorySynchronizer;
pub use undo_ledger::UndoLedgerService;
