//! CLI command implementations

pub mod config;
pub mod diff;
pub mod log;
pub mod save;
pub mod show;
pub mod status;
