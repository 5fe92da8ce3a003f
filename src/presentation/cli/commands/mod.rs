pub mod init;
pub mod ledger;
pub mod run;
pub mod trigger;
pub mod undo;

pub use init::*;
pub use ledger::*;
pub use run::*;
pub use trigger::*;
pub use undo::*;
