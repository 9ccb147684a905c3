mod cli;
mod commands;
mod report;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcribe_core::{config::DEFAULT_CONFIG_FILE, load_config, load_config_or_default, Config};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => {
            debug!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        None => load_config_or_default(Some(Path::new(DEFAULT_CONFIG_FILE)))
            .context("Failed to load configuration"),
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load(&cli)?;

    match cli.command {
        Command::File { file, output } => commands::transcribe_file(config, file, output).await,
        Command::Batch {
            dir,
            output,
            concurrency,
            recursive,
            skip_existing,
        } => {
            commands::transcribe_batch(config, dir, output, concurrency, recursive, skip_existing)
                .await
        }
        Command::Extract {
            file,
            output,
            format,
        } => commands::extract_audio(config, file, output, format).await,
        Command::Config => commands::show_config(&config),
    }
}
