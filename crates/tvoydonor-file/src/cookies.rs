//! Cookie jar persistence.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use tvoydonor_core::Result;

use crate::store::{map_io, restrict_permissions};

/// Holds a `name=value; name2=value2` cookie header between runs.
///
/// The jar carries the HTTP-only refresh cookie, so the file is 0600.
#[derive(Debug, Clone)]
pub struct CookieFile {
    path: PathBuf,
}

impl CookieFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved header, if any.
    pub fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(header) => {
                let header = header.trim();
                Ok((!header.is_empty()).then(|| header.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io(e)),
        }
    }

    /// Save `header`, or remove the file when the jar is empty.
    pub fn save(&self, header: Option<&str>) -> Result<()> {
        let Some(header) = header.filter(|h| !h.trim().is_empty()) else {
            return self.clear();
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }
        fs::write(&self.path, header).map_err(map_io)?;
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "Saved cookies");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io(e)),
        }
    }
}
