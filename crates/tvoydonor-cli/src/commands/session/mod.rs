//! Session subcommand implementations.

mod fetch;
mod login_donor;
mod login_medcenter;
mod logout;
mod refresh;
mod silent_login;
mod token;
mod validate;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::session::Environment;

#[derive(Args, Debug)]
pub struct SessionCommand {
    #[command(subcommand)]
    pub command: SessionSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionSubcommand {
    /// Log in as a donor
    LoginDonor(login_donor::LoginDonorArgs),

    /// Log in as a medical center
    LoginMedcenter(login_medcenter::LoginMedcenterArgs),

    /// Log in with the stored refresh credential or the host identity data
    SilentLogin(silent_login::SilentLoginArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Print a valid access token, refreshing if needed
    Token(token::TokenArgs),

    /// Refresh the session
    Refresh(refresh::RefreshArgs),

    /// Check the session against the backend
    Validate(validate::ValidateArgs),

    /// Send an authenticated request
    Fetch(fetch::FetchArgs),

    /// Log out and clear the session
    Logout(logout::LogoutArgs),
}

pub async fn handle(cmd: SessionCommand, env: Environment) -> Result<()> {
    match cmd.command {
        SessionSubcommand::LoginDonor(args) => login_donor::run(args, &env).await,
        SessionSubcommand::LoginMedcenter(args) => login_medcenter::run(args, &env).await,
        SessionSubcommand::SilentLogin(args) => silent_login::run(args, &env).await,
        SessionSubcommand::Whoami(args) => whoami::run(args, &env).await,
        SessionSubcommand::Token(args) => token::run(args, &env).await,
        SessionSubcommand::Refresh(args) => refresh::run(args, &env).await,
        SessionSubcommand::Validate(args) => validate::run(args, &env).await,
        SessionSubcommand::Fetch(args) => fetch::run(args, &env).await,
        SessionSubcommand::Logout(args) => logout::run(args, &env).await,
    }
}
