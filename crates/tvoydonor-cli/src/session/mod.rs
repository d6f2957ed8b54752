//! Session wiring for the CLI: stores, host adapter, cookie persistence.

pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{debug, warn};

use tvoydonor_core::{ApiUrl, KeyValueStore, Navigator};
use tvoydonor_file::{CookieFile, FileStore};
use tvoydonor_http::{ApiClient, SessionConfig, SessionManager, select_host};

use storage::DataDir;

/// Global options shared by every command.
#[derive(Debug, Clone)]
pub struct Environment {
    pub api_url: String,
    pub init_data: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub legacy_token_mirror: bool,
}

/// "Navigating" to login in a terminal means telling the user what to run.
struct LoginHint;

impl Navigator for LoginHint {
    fn redirect_to_login(&self) {
        eprintln!(
            "{} {}",
            "→".yellow(),
            "Signed out. Run 'tvoydonor session login-donor' or 'tvoydonor session login-medcenter'."
        );
    }
}

/// A session manager whose cookie jar outlives the process.
pub struct CliSession {
    pub manager: SessionManager,
    cookies: CookieFile,
}

impl CliSession {
    /// Build the session for `env` and restore any stored markers.
    pub async fn open(env: &Environment) -> Result<Self> {
        let api = ApiUrl::new(&env.api_url).context("Invalid API URL")?;
        let data = DataDir::resolve(env.data_dir.as_deref())?;

        let client = ApiClient::new(api).context("Failed to build HTTP client")?;
        let cookies = CookieFile::new(data.cookie_path());
        match cookies.load() {
            Ok(Some(header)) => client.import_cookies(&header),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable cookie file"),
        }

        let device: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(data.device_path()));
        let cloud: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(data.cloud_path()));
        let host = select_host(env.init_data.as_deref(), device, Some(cloud));

        let config = SessionConfig {
            legacy_token_mirror: env.legacy_token_mirror,
            ..SessionConfig::default()
        };
        let manager = SessionManager::with_config(client, host, Arc::new(LoginHint), config);
        if manager.restore().await {
            debug!("Restored stored session markers");
        }

        Ok(Self { manager, cookies })
    }

    /// Write the cookie jar back to disk.
    pub fn persist(&self) -> Result<()> {
        let header = self.manager.client().export_cookies();
        self.cookies
            .save(header.as_deref())
            .context("Failed to save cookies")
    }
}
