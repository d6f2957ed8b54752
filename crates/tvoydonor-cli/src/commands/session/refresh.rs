//! Refresh command implementation.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::{CliSession, Environment};

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, env: &Environment) -> Result<()> {
    let cli = CliSession::open(env).await?;

    eprintln!("{}", "Refreshing session...".dimmed());

    let refreshed = cli.manager.refresh().await;
    cli.persist()?;

    if !refreshed {
        if cli.manager.user_type().is_some() {
            bail!("Refresh failed; the session is kept. Check your connection.");
        }
        bail!("Session expired. Log in again.");
    }

    output::success("Session refreshed");
    if let Some(session) = cli.manager.session() {
        output::identity(None, session.user_type, &session.profile);
        output::expiry(&session.access_token);
    }

    Ok(())
}
