//! Donor login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tvoydonor_core::DonorCredentials;

use crate::output;
use crate::session::{CliSession, Environment};

#[derive(Args, Debug)]
pub struct LoginDonorArgs {
    /// Full name as registered
    #[arg(long)]
    pub full_name: String,

    /// Year of birth
    #[arg(long)]
    pub birth_year: i32,

    /// Medical center the donor is registered with
    #[arg(long)]
    pub medical_center_id: i64,

    /// Account password
    #[arg(long, env = "TVOYDONOR_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginDonorArgs, env: &Environment) -> Result<()> {
    let cli = CliSession::open(env).await?;
    let credentials = DonorCredentials::new(
        args.full_name,
        args.birth_year,
        args.medical_center_id,
        args.password,
    );

    eprintln!("{}", "Logging in...".dimmed());

    let session = cli
        .manager
        .login_donor(&credentials)
        .await
        .context("Failed to login")?;
    cli.persist()?;

    output::success("Logged in");
    output::identity(None, session.user_type, &session.profile);

    Ok(())
}
