//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::session::SessionCommand;
use crate::session::Environment;

/// Tvoy Donor session client.
#[derive(Parser, Debug)]
#[command(name = "tvoydonor")]
#[command(author, version = env!("TVOYDONOR_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Backend API base URL
    #[arg(
        long,
        env = "TVOYDONOR_API_URL",
        default_value = "https://tvoydonor.by/api",
        global = true
    )]
    pub api_url: String,

    /// Signed identity data from an embedded host; selects the embedded host
    #[arg(long, env = "TVOYDONOR_INIT_DATA", global = true, hide_env_values = true)]
    pub init_data: Option<String>,

    /// Directory for session markers and cookies
    #[arg(long, env = "TVOYDONOR_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Mirror the access token to the legacy `auth_token` key
    #[arg(long, env = "TVOYDONOR_LEGACY_TOKEN_MIRROR", global = true)]
    pub legacy_token_mirror: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn environment(&self) -> Environment {
        Environment {
            api_url: self.api_url.clone(),
            init_data: self.init_data.clone(),
            data_dir: self.data_dir.clone(),
            legacy_token_mirror: self.legacy_token_mirror,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Session operations: login, refresh, authenticated calls, logout
    Session(SessionCommand),
}
