//! Input and passphrase helper functions for the CLI.

use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use dialoguer::Password;
use zeroize::Zeroizing;

use crate::constants::{PASSPHRASE_ENV, SEALED_SUFFIX};
use crate::errors::CliError;

/// Whether prompts may be shown.
pub fn is_interactive(no_input: bool) -> bool {
    io::stdin().is_terminal() && !no_input
}

/// Passphrase from the environment, if set and not blank.
pub fn env_passphrase() -> Option<Zeroizing<String>> {
    std::env::var(PASSPHRASE_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(Zeroizing::new)
}

/// Prompt for passphrase, or read from VELLUM_PASSPHRASE env var.
pub fn prompt_passphrase(interactive: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Some(value) = env_passphrase() {
        return Ok(value);
    }
    if !interactive {
        return Err(no_passphrase_error().into());
    }
    Password::new()
        .with_prompt("Passphrase")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Prompt for a new passphrase with confirmation, or read from VELLUM_PASSPHRASE.
pub fn prompt_new_passphrase(interactive: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Some(value) = env_passphrase() {
        return Ok(value);
    }
    if !interactive {
        return Err(no_passphrase_error().into());
    }
    Password::new()
        .with_prompt("Enter passphrase")
        .with_confirmation("Confirm passphrase", "Passphrases do not match")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

fn no_passphrase_error() -> CliError {
    CliError::invalid_input(format!(
        "No passphrase provided and no TTY available. Set {}.",
        PASSPHRASE_ENV
    ))
}

pub fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read a file, or stdin for "-".
pub fn read_input(path: &Path) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    let mut buffer = Zeroizing::new(Vec::new());
    if is_stdio(path) {
        io::stdin()
            .read_to_end(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        return Ok(buffer);
    }
    match std::fs::read(path) {
        Ok(bytes) => {
            *buffer = bytes;
            Ok(buffer)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(CliError::not_found(
            format!("No such file: {}", path.display()),
            "Check the path and try again.",
        )
        .into()),
        Err(err) => Err(anyhow::anyhow!("Failed to read {}: {}", path.display(), err)),
    }
}

/// Read an envelope document as text.
pub fn read_envelope_text(path: &Path) -> anyhow::Result<String> {
    let bytes = read_input(path)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| CliError::invalid_input("Envelope is not valid UTF-8").into())
}

/// Write to a file atomically, or to stdout when `path` is None.
pub fn write_output(path: Option<&Path>, contents: &[u8]) -> anyhow::Result<()> {
    match path {
        Some(path) => vellum_core::fs::write_atomic(path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e)),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Default envelope path for a sealed input: `<input>.vellum.json`.
pub fn sealed_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(SEALED_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sealed_path_appends_suffix() {
        assert_eq!(
            sealed_path(Path::new("/tmp/inventory.json")),
            PathBuf::from("/tmp/inventory.json.vellum.json")
        );
    }

    #[test]
    fn test_dash_is_stdio() {
        assert!(is_stdio(Path::new("-")));
        assert!(!is_stdio(Path::new("./-x")));
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let err = read_input(Path::new("/definitely/not/here.json")).unwrap_err();
        let cli_err = err.downcast_ref::<CliError>().unwrap();
        assert_eq!(cli_err.exit_code(), crate::constants::exit_codes::NOT_FOUND);
    }
}
