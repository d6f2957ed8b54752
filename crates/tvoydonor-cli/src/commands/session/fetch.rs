//! Authenticated request command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tvoydonor_http::{ApiRequest, Method};

use crate::session::{CliSession, Environment};

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// HTTP method (GET, POST, PUT, DELETE, ...)
    pub method: String,

    /// Path relative to the API base, e.g. /donor/profile
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,
}

pub async fn run(args: FetchArgs, env: &Environment) -> Result<()> {
    let method: Method = args
        .method
        .to_uppercase()
        .parse()
        .context("Invalid HTTP method")?;

    let mut request = ApiRequest::new(method, args.path);
    if let Some(body) = &args.body {
        let body = serde_json::from_str(body).context("Invalid JSON body")?;
        request = request.json(body);
    }

    let cli = CliSession::open(env).await?;
    let result = cli.manager.auth_fetch(&request).await;
    cli.persist()?;
    let response = result.context("Request failed")?;

    let status = response.status();
    let text = response.text().await.context("Failed to read response")?;

    let label = if status.is_success() {
        status.to_string().green()
    } else {
        status.to_string().red()
    };
    eprintln!("{}", label);

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    Ok(())
}
