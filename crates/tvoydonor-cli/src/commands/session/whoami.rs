//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::{CliSession, Environment};

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the stored profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, env: &Environment) -> Result<()> {
    let cli = CliSession::open(env).await?;

    let user_type = cli
        .manager
        .user_type()
        .context("No active session. Run 'tvoydonor session login-donor' first.")?;
    let profile = cli.manager.profile().unwrap_or_default();

    if args.json {
        return output::profile_json(&profile);
    }

    output::identity(Some(cli.manager.host_kind()), user_type, &profile);

    Ok(())
}
