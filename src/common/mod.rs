//! Shared error types, result helpers, logging setup and embedded templates

pub mod error;
pub mod logging;
pub mod result;
pub mod templates;
