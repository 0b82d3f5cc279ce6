use clap::Parser;
use haru_client::ApiClient;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli_args;
mod cli_command;
mod modules;

use crate::cli_args::*;
use crate::cli_command::handle_command;
use crate::modules::system::{
    handle_config_command, load_config, open_token_store, resolve_client_config, save_config,
};

pub(crate) const SESSION_EXPIRED: &str = "session expired; run `haru login` to sign in again";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let mut config = load_config()?;

    let command = match cli.command {
        Command::Config(args) => {
            handle_config_command(args, &mut config)?;
            return save_config(&config);
        }
        command => command,
    };

    let tokens = open_token_store(cli.token_store.unwrap_or(config.token_store))?;
    let client_config = resolve_client_config(cli.addr.as_deref(), cli.insecure, &config)?;
    let client = ApiClient::new(client_config, tokens)?;

    let mut session = client.subscribe();
    let manages_session = command.manages_session();
    let outcome = handle_command(command, &client).await;
    if session.drain() > 0 && !manages_session {
        if let Err(err) = &outcome {
            debug!(error = %err, "command failed after session invalidation");
        }
        anyhow::bail!(SESSION_EXPIRED);
    }
    outcome
}

fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter)?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
