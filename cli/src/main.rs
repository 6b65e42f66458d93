//! `push-helper`: run push service operations from the command line.
//!
//! Prints the response body on stdout and exits non-zero when the service
//! reports a failure or cannot be reached.

mod cli;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use push_helper_core::{Outcome, PushClient, UreqTransport};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(client: &PushClient<UreqTransport>, command: Command) -> Result<Outcome> {
    let outcome = match command {
        Command::UpsertUser(args) => client.upsert_user(args.user_id.as_deref(), &args.user_data()).await?,
        Command::DeleteUser { user_id } => client.delete_user(&user_id).await?,
        Command::DeleteDevice { user_id, token } => client.delete_device_from_user(&user_id, &token).await?,
        Command::Send(args) => client.send(args.recipients(), args.message.message()).await?,
        Command::SendAll(args) => client.send_all(args.message()).await?,
    };
    Ok(outcome)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let transport = UreqTransport::with_timeout(Some(Duration::from_secs(cli.timeout_secs)));
    let mut client = PushClient::new(transport);
    client
        .configure(&cli.api_root, &cli.app_name)
        .context("invalid push service configuration")?;

    let outcome = run(&client, cli.command).await?;
    if let Some(body) = outcome.body.as_deref().filter(|b| !b.is_empty()) {
        println!("{body}");
    }
    if let Some(failure) = &outcome.failure {
        bail!("push service request failed: {failure}");
    }
    Ok(())
}
