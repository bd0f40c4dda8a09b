//! eduhub: terminal client for the EduHub portal.

mod cli;
mod shell;

use std::process::ExitCode;

use eduhub_client::EduhubClient;
use tracing_subscriber::EnvFilter;

use crate::shell::Shell;

const DEFAULT_LOG_DIRECTIVE: &str = "eduhub=info";

/// `--log-level` wins, then `RUST_LOG`, then the configured level.
fn env_filter(flag: Option<&str>, configured: &str) -> EnvFilter {
    let filter = match flag {
        Some(directive) => EnvFilter::try_new(directive),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(configured)),
    };
    filter.unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let config = match eduhub_config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("eduhub: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(args.log_level.as_deref(), &config.logging.level))
        .with_writer(std::io::stderr)
        .init();

    let client = match EduhubClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("eduhub: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(base_url = %config.api.base_url, "eduhub shell starting");

    let mut shell = Shell::new(client);
    if let Err(e) = shell.run().await {
        eprintln!("eduhub: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
