//! CLI library components for perfload.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
