//! Shared helpers for CLI commands

pub mod config;
pub mod input;
pub mod logging;
pub mod output;
