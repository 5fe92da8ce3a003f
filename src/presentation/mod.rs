//! Presentation layer: clap command line and terminal output

pub mod cli;
pub mod ui;
