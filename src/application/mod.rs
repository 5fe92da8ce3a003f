//! Application layer: the archive, undo, sync and publish services and the use cases
//! that compose them into the pipeline and the auxiliary commands.

pub mod services;
pub mod use_cases;
