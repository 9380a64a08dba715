use std::path::Path;

use crate::cli::{Cli, ConfigAction};
use crate::config::{load_config, render_config, write_config, VellumConfig};
use crate::errors::CliError;

pub fn handle_config(cli: &Cli, action: &ConfigAction, path: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::invalid_input(format!(
                    "Config already exists at {}. Use --force to overwrite.",
                    path.display()
                ))
                .into());
            }
            write_config(path, &VellumConfig::default())?;
            if !cli.quiet {
                println!("Wrote {}", path.display());
            }
        }
        ConfigAction::Show => {
            let config = load_config(path)?;
            print!("{}", render_config(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }
    Ok(())
}
