//! JSON-file key-value store.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tracing::{debug, instrument, warn};

use tvoydonor_core::error::{Error, StorageError};
use tvoydonor_core::{KeyValueStore, Result};

pub(crate) fn map_io(err: std::io::Error) -> Error {
    Error::Storage(StorageError::Io {
        message: err.to_string(),
    })
}

/// Restrict a secrets file to its owner.
pub(crate) fn restrict_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(path).map_err(map_io)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms).map_err(map_io)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// A flat string map persisted as one JSON object.
///
/// Writes take an exclusive `fs2` lock on a sibling `.lock` file and
/// replace the data file atomically, so two processes sharing a data
/// directory never interleave. The file is created with mode 0600.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// A store backed by `path`. Nothing is touched until the first call.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the data file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(map_io(e)),
        };
        if json.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&json).map_err(|e| {
            Error::from(StorageError::Corrupt {
                message: format!("{}: {}", self.path.display(), e),
            })
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(map).map_err(|e| StorageError::Corrupt {
            message: e.to_string(),
        })?;

        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(map_io)?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &self.path).map_err(map_io)?;
        Ok(())
    }

    /// Run a read-modify-write under the exclusive lock.
    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(map_io)?;
        lock_file.lock_exclusive().map_err(map_io)?;

        let result = self.apply(f);

        lock_file.unlock().map_err(map_io)?;
        result
    }

    fn apply<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(Error::Storage(StorageError::Corrupt { message })) => {
                warn!(%message, "Replacing corrupt store file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        if f(&mut map) {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
            true
        })?;
        debug!("Stored key");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn remove(&self, key: &str) -> Result<()> {
        self.update(|map| map.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("device.json"));

        assert_eq!(store.get("user_type").await.unwrap(), None);
        store.remove("user_type").await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_reported_then_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("device.json");
        fs::write(&path, "{not json").unwrap();
        let store = FileStore::new(&path);

        assert!(matches!(
            store.get("user_type").await,
            Err(Error::Storage(StorageError::Corrupt { .. }))
        ));

        store.set("user_type", "donor").await.unwrap();
        assert_eq!(
            store.get("user_type").await.unwrap().as_deref(),
            Some("donor")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn data_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("cloud.json"));
        store.set("tvoydonor_refresh_token", "rt").await.unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
