//! Data directory layout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Device storage markers.
const DEVICE_FILE: &str = "device.json";
/// Simulated cloud storage of an embedded host.
const CLOUD_FILE: &str = "cloud.json";
/// Transport cookie jar.
const COOKIE_FILE: &str = "cookies.txt";

/// Files backing one CLI profile.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Use `dir` if given, else the platform data directory.
    pub fn resolve(dir: Option<&Path>) -> Result<Self> {
        let root = match dir {
            Some(dir) => dir.to_path_buf(),
            None => ProjectDirs::from("by", "tvoydonor", "tvoydonor")
                .context("Could not determine data directory")?
                .data_dir()
                .to_path_buf(),
        };
        fs::create_dir_all(&root).context("Failed to create data directory")?;
        Ok(Self { root })
    }

    pub fn device_path(&self) -> PathBuf {
        self.root.join(DEVICE_FILE)
    }

    pub fn cloud_path(&self) -> PathBuf {
        self.root.join(CLOUD_FILE)
    }

    pub fn cookie_path(&self) -> PathBuf {
        self.root.join(COOKIE_FILE)
    }
}
