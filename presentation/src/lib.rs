//! Presentation layer for selfcheck
//!
//! This crate contains CLI definitions, output formatters,
//! and the interactive run REPL.

pub mod cli;
pub mod config;
pub mod output;
pub mod take;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, EditCommand, FocusCommand};
pub use config::{OutputConfig, ReplConfig};
pub use output::console::ConsoleFormatter;
pub use take::{ReplInput, TakeRepl};
