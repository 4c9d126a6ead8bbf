//! CLI library components for the column generalizer.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
