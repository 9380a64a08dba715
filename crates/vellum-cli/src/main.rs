//! Vellum CLI - password-sealed envelopes and request throttling
//!
//! Thin command-line front end over `vellum-core`.

mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::{handle_config, handle_open, handle_seal, handle_throttle, handle_verify, SealArgs};
use crate::config::{load_config, resolve_config_path, LoggingSection};
use crate::errors::exit_with_error;
use crate::logging::init_logging;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        exit_with_error(err);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    // Completions must work without a readable config.
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "vellum", &mut std::io::stdout());
        return Ok(());
    }

    let config_path = resolve_config_path(cli.config.as_deref())?;

    // Config management must work even when the file is broken.
    if let Commands::Config { action } = &cli.command {
        init_logging(&LoggingSection::default(), cli.verbose);
        return handle_config(cli, action, &config_path);
    }

    let config = load_config(&config_path)?;
    init_logging(&config.logging, cli.verbose);
    tracing::debug!(path = %config_path.display(), "configuration loaded");

    match &cli.command {
        Commands::Seal {
            inputs,
            output,
            shared_salt,
            kdf,
        } => {
            let codec = config.kdf.codec(kdf.map(Into::into))?;
            handle_seal(
                cli,
                codec,
                SealArgs {
                    inputs,
                    output: output.as_deref(),
                    shared_salt: *shared_salt,
                },
            )
        }
        Commands::Open { envelope, output } => {
            let codec = config.kdf.codec(None)?;
            handle_open(cli, &codec, envelope, output.as_deref())
        }
        Commands::Verify { envelope } => handle_verify(cli, envelope),
        Commands::Throttle { limit, window_ms } => {
            handle_throttle(cli, &config.rate_limit, *limit, *window_ms)
        }
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}
