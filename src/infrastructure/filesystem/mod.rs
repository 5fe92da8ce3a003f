pub mod config_store;
pub mod file_mover;
pub mod ledger_store;
pub mod lock_file;

pub use config_store::{ConfigStore, DEFAULT_CONFIG_FILE};
pub use ledger_store::LedgerStore;
pub use lock_file::LockFile;
