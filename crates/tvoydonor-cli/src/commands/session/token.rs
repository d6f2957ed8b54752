//! Token command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::{CliSession, Environment};

#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Also print the token's expiry
    #[arg(long)]
    pub expiry: bool,
}

pub async fn run(args: TokenArgs, env: &Environment) -> Result<()> {
    let cli = CliSession::open(env).await?;

    let token = cli.manager.get_token().await;
    cli.persist()?;
    let token = token.context("No valid session")?;

    println!("{}", token.as_str());
    if args.expiry {
        output::expiry(&token);
    }

    Ok(())
}
