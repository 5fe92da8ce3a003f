//! Domain layer: pipeline configuration, archive and ledger records, stages and
//! the validated branch/remote value objects.

pub mod entities;
pub mod value_objects;
