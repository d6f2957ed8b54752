//! Medical center login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tvoydonor_core::MedicalCenterCredentials;

use crate::output;
use crate::session::{CliSession, Environment};

#[derive(Args, Debug)]
pub struct LoginMedcenterArgs {
    /// Medical center ID
    #[arg(long)]
    pub medical_center_id: i64,

    /// Center password
    #[arg(long, env = "TVOYDONOR_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginMedcenterArgs, env: &Environment) -> Result<()> {
    let cli = CliSession::open(env).await?;
    let credentials = MedicalCenterCredentials::new(args.medical_center_id, args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let session = cli
        .manager
        .login_medical_center(&credentials)
        .await
        .context("Failed to login")?;
    cli.persist()?;

    output::success("Logged in");
    output::identity(None, session.user_type, &session.profile);

    Ok(())
}
