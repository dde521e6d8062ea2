//! Configuration file loading for selfcheck
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `SELFCHECK_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./selfcheck.toml` or `./.selfcheck.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/selfcheck/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLoggingConfig, FileOutputConfig, FileOutputFormat,
    FileStorageConfig, FileSurveyConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
