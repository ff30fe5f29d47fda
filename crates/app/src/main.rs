mod cli;
mod commands;
mod config;

use std::sync::Arc;

use gateway::StaticToken;
use services::{AppServices, Clock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Invocation, print_usage};
use crate::commands::AppError;
use crate::config::Config;

async fn run() -> Result<(), AppError> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if matches!(argv.first().map(String::as_str), Some("--help" | "-h") | None) {
        print_usage();
        return Ok(());
    }

    let invocation = Invocation::parse(argv).inspect_err(|e| {
        eprintln!("{e}");
        print_usage();
    })?;

    let config = Config::from_env(&invocation.overrides)?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    tracing::debug!(base_url = %config.gateway.base_url, "configuration loaded");

    let tokens = Arc::new(StaticToken::new(config.id_token));
    let services = AppServices::http(config.gateway, tokens, Clock::default())?;

    let mut stdout = std::io::stdout().lock();
    commands::run(invocation.command, &services, &mut stdout).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}
