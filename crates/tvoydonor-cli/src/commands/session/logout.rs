//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::output;
use crate::session::{CliSession, Environment};

#[derive(Args, Debug)]
pub struct LogoutArgs {
    /// End the session on every device
    #[arg(long)]
    pub all: bool,
}

pub async fn run(args: LogoutArgs, env: &Environment) -> Result<()> {
    let cli = CliSession::open(env).await?;

    if args.all {
        cli.manager.logout_all().await;
    } else {
        cli.manager.logout().await;
    }
    cli.persist()?;

    output::success(if args.all {
        "Logged out on all devices"
    } else {
        "Logged out"
    });

    Ok(())
}
