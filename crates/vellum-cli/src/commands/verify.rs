use std::path::Path;

use vellum_core::crypto::{EncryptedEnvelope, EnvelopeVersion};

use crate::cli::Cli;
use crate::helpers::read_envelope_text;

/// Structural check only; no passphrase is needed.
pub fn handle_verify(cli: &Cli, envelope_path: &Path) -> anyhow::Result<()> {
    let text = read_envelope_text(envelope_path)?;
    let envelope = EncryptedEnvelope::from_json(&text)?;
    envelope.validate()?;

    let version = envelope.format_version()?;
    tracing::debug!(path = %envelope_path.display(), ?version, "envelope verified");
    if !cli.quiet {
        println!(
            "{}: well formed (version {}, kdf {})",
            envelope_path.display(),
            version_number(version),
            version.algorithm()
        );
    }
    Ok(())
}

fn version_number(version: EnvelopeVersion) -> u8 {
    match version {
        EnvelopeVersion::V1 => 1,
        EnvelopeVersion::V2 => 2,
    }
}
