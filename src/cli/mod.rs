//! Command-line interface
//!
//! - Argument parsing structures
//! - Command routing
//! - Command implementations

pub mod args;
pub mod commands;
pub mod router;

pub use args::{Cli, Commands, OutputFormat};
pub use router::execute_command;
