//! Validate command implementation.

use anyhow::{Result, bail};
use clap::Args;

use tvoydonor_core::Validation;

use crate::output;
use crate::session::{CliSession, Environment};

#[derive(Args, Debug)]
pub struct ValidateArgs {}

pub async fn run(_args: ValidateArgs, env: &Environment) -> Result<()> {
    let cli = CliSession::open(env).await?;

    let validation = cli.manager.validate().await;
    cli.persist()?;

    match validation {
        Validation::Valid(profile) => {
            output::success("Session valid");
            if let Some(user_type) = cli.manager.user_type() {
                output::identity(None, user_type, &profile);
            }
        }
        Validation::Offline => {
            output::warning("Backend unreachable; keeping the stored session");
        }
        Validation::Invalid => bail!("Session invalid"),
    }

    Ok(())
}
