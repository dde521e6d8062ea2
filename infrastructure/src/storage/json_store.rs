//! Directory of JSON documents keyed by file name.
//!
//! Reads degrade instead of failing: a missing file yields the default
//! value and an unparsable one is logged and treated as missing. Updates are
//! strict instead: a bucket that cannot be parsed is never overwritten, and
//! entries this build cannot decode are written back untouched. Writes go to
//! a temporary sibling first and are renamed into place.

use selfcheck_application::RepositoryError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// `{"byId": {...}}` wrapper used for every bucket file.
#[derive(Debug, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Bucket<T> {
    #[serde(default = "BTreeMap::new")]
    pub by_id: BTreeMap<String, T>,
}

impl<T> Default for Bucket<T> {
    fn default() -> Self {
        Self {
            by_id: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Read a document, falling back to `T::default()` when it is missing
    /// or unparsable.
    pub async fn read_or_default<T>(&self, name: &str) -> Result<T, RepositoryError>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.path(name);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(io_error(&path, e)),
        };

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("Ignoring unreadable {}: {}", path.display(), e);
                Ok(T::default())
            }
        }
    }

    /// Strict read: `Ok(None)` when missing, an error when unparsable.
    pub async fn read_optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, RepositoryError> {
        let path = self.path(name);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| RepositoryError::Serialization(format!("{}: {}", path.display(), e)))
    }

    /// Read a bucket, keeping only the entries that decode as `T`.
    pub(crate) async fn read_bucket<T>(&self, name: &str) -> Result<BTreeMap<String, T>, RepositoryError>
    where
        T: DeserializeOwned,
    {
        let raw: Bucket<serde_json::Value> = self.read_or_default(name).await?;
        let mut entries = BTreeMap::new();
        for (id, value) in raw.by_id {
            match serde_json::from_value(value) {
                Ok(entry) => {
                    entries.insert(id, entry);
                }
                Err(e) => warn!("Skipping malformed entry {} in {}: {}", id, name, e),
            }
        }
        Ok(entries)
    }

    /// Insert or replace one entry of a bucket.
    ///
    /// Fails without writing when the bucket file exists but cannot be
    /// parsed. Other entries are kept as raw JSON, including ones that no
    /// longer decode.
    pub(crate) async fn upsert_entry<T>(&self, name: &str, id: &str, entry: &T) -> Result<(), RepositoryError>
    where
        T: Serialize,
    {
        let mut raw = self.read_raw_bucket(name).await?;
        let value = serde_json::to_value(entry)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        raw.insert(id.to_string(), value);
        self.write_bucket(name, raw).await
    }

    /// Drop one entry of a bucket. Returns whether the entry existed.
    ///
    /// Same strictness as [`Self::upsert_entry`].
    pub(crate) async fn remove_entry(&self, name: &str, id: &str) -> Result<bool, RepositoryError> {
        let mut raw = self.read_raw_bucket(name).await?;
        if raw.remove(id).is_none() {
            return Ok(false);
        }
        self.write_bucket(name, raw).await?;
        Ok(true)
    }

    async fn read_raw_bucket(&self, name: &str) -> Result<BTreeMap<String, serde_json::Value>, RepositoryError> {
        Ok(self
            .read_optional::<Bucket<serde_json::Value>>(name)
            .await?
            .map(|bucket| bucket.by_id)
            .unwrap_or_default())
    }

    pub(crate) async fn write_bucket<T>(
        &self,
        name: &str,
        entries: BTreeMap<String, T>,
    ) -> Result<(), RepositoryError>
    where
        T: Serialize,
    {
        self.write(name, &Bucket { by_id: entries }).await
    }

    /// Write a document atomically (temp file + rename).
    pub async fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), RepositoryError> {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        let json = serde_json::to_string_pretty(value)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;

        debug!("Wrote {}", path.display());
        Ok(())
    }

    /// Delete a document. Deleting a missing document is a no-op.
    pub async fn remove(&self, name: &str) -> Result<(), RepositoryError> {
        let path = self.path(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    /// File names (not paths) of the `.json` documents under `subdir`.
    pub async fn list(&self, subdir: &str) -> Result<Vec<String>, RepositoryError> {
        let dir = self.path(subdir);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&dir, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&dir, e))? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".json") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Make an owner key or record id safe to use as a file name component.
///
/// Percent-encodes everything outside `[A-Za-z0-9-_~]`, dots included, so
/// distinct keys always map to distinct names and no key can name `..`.
pub fn file_safe(key: &str) -> String {
    urlencoding::encode(key).replace('.', "%2E")
}

fn io_error(path: &Path, e: std::io::Error) -> RepositoryError {
    RepositoryError::Io(format!("{}: {}", path.display(), e))
}
