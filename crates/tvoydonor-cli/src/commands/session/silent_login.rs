//! Silent login command implementation.

use anyhow::{Result, bail};
use clap::Args;

use crate::output;
use crate::session::{CliSession, Environment};

#[derive(Args, Debug)]
pub struct SilentLoginArgs {}

pub async fn run(_args: SilentLoginArgs, env: &Environment) -> Result<()> {
    let cli = CliSession::open(env).await?;

    let session = cli.manager.silent_login().await;
    cli.persist()?;

    let Some(session) = session else {
        bail!("Silent login failed. Open the app from the host or log in with a password.");
    };

    output::success("Logged in");
    output::identity(
        Some(cli.manager.host_kind()),
        session.user_type,
        &session.profile,
    );

    Ok(())
}
