//! Presentation-level configuration
//!
//! Resolved output and REPL settings. File values are merged with the
//! command-line flags before anything is printed.

use selfcheck_domain::OutputFormat;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

impl OutputConfig {
    pub fn new(format: Option<OutputFormat>, color: bool) -> Self {
        Self {
            format: format.unwrap_or_default(),
            color,
        }
    }

    /// Apply `--json` and `--no-color`. Flags only ever narrow the file settings.
    pub fn with_flags(mut self, json: bool, no_color: bool) -> Self {
        if json {
            self.format = OutputFormat::Json;
        }
        if no_color {
            self.color = false;
        }
        self
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Globally disable ANSI colors when turned off. JSON output is never colored.
    pub fn apply_color(&self) {
        if !self.color || self.is_json() {
            colored::control::set_override(false);
        }
    }
}

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplConfig {
    /// Keep input history across sessions
    pub save_history: bool,
    /// Print the command help when a run starts
    pub show_help: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            save_history: true,
            show_help: true,
        }
    }
}
