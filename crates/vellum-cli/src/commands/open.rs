use std::path::Path;

use vellum_core::crypto::{Codec, EncryptedEnvelope};
use vellum_core::VellumError;
use zeroize::Zeroizing;

use crate::cli::Cli;
use crate::constants::MAX_PASSPHRASE_ATTEMPTS;
use crate::errors::CliError;
use crate::helpers::{env_passphrase, is_interactive, prompt_passphrase, read_envelope_text, write_output};

pub fn handle_open(
    cli: &Cli,
    codec: &Codec,
    envelope_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let text = read_envelope_text(envelope_path)?;
    let envelope = EncryptedEnvelope::from_json(&text)?;
    // Reject malformed input before asking for a passphrase.
    envelope.validate()?;

    let interactive = is_interactive(cli.no_input);
    let plaintext = decrypt_with_retry(codec, &envelope, interactive)?;

    write_output(output, &plaintext)?;
    if let Some(path) = output {
        if !cli.quiet {
            println!("Opened {} -> {}", envelope_path.display(), path.display());
        }
    }
    Ok(())
}

/// Decrypt, re-prompting on authentication failure when a person is typing.
///
/// A passphrase from the environment gets exactly one attempt.
fn decrypt_with_retry(
    codec: &Codec,
    envelope: &EncryptedEnvelope,
    interactive: bool,
) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    let max_attempts = if interactive && env_passphrase().is_none() {
        MAX_PASSPHRASE_ATTEMPTS
    } else {
        1
    };
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let passphrase = prompt_passphrase(interactive)?;
        match codec.decrypt(envelope, &passphrase) {
            Ok(plaintext) => return Ok(Zeroizing::new(plaintext)),
            Err(VellumError::Authentication) if attempts < max_attempts => {
                let remaining = max_attempts - attempts;
                eprintln!(
                    "Incorrect password or corrupted data. {} attempt{} remaining.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
            Err(VellumError::Authentication) if max_attempts > 1 => {
                return Err(CliError::auth_failed_with_hint(
                    "Too many failed passphrase attempts.",
                    "Hint: a forgotten passphrase cannot be recovered.",
                )
                .into());
            }
            Err(err) => return Err(err.into()),
        }
    }
}
