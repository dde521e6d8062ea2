//! Storage configuration from TOML (`[storage]` section)

use selfcheck_domain::OwnerScope;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw storage configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory of the local bucket files (platform data dir when unset)
    pub data_dir: Option<PathBuf>,
    /// Owner uid; empty or unset means anonymous
    pub owner: Option<String>,
    /// Root of the document-store mirror; mirroring is off when unset
    pub mirror_dir: Option<PathBuf>,
}

impl FileStorageConfig {
    /// Configured data directory, or `<platform data dir>/selfcheck`.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("selfcheck"))
                .unwrap_or_else(|| PathBuf::from(".selfcheck"))
        })
    }

    pub fn owner_scope(&self) -> OwnerScope {
        OwnerScope::from_uid(self.owner.as_deref())
    }
}
