//! CLI commands

pub mod completion;
pub mod convert;
