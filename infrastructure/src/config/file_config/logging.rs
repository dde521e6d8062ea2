//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write the JSONL activity log (`activity.jsonl` in the data dir)
    pub activity_log: bool,
    /// Directory for daily-rolling diagnostic log files; stderr only when unset
    pub dir: Option<PathBuf>,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            activity_log: true,
            dir: None,
        }
    }
}

impl FileLoggingConfig {
    /// Activity log location, or `None` when disabled.
    pub fn activity_log_path(&self, data_dir: &Path) -> Option<PathBuf> {
        self.activity_log.then(|| data_dir.join("activity.jsonl"))
    }
}
