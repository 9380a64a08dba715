use std::path::{Path, PathBuf};

use vellum_core::crypto::{validate_passphrase, Codec, EncryptedEnvelope, UnlockedSession};

use crate::cli::Cli;
use crate::errors::CliError;
use crate::helpers::{is_interactive, is_stdio, prompt_new_passphrase, read_input, sealed_path, write_output};

pub struct SealArgs<'a> {
    pub inputs: &'a [PathBuf],
    pub output: Option<&'a Path>,
    pub shared_salt: bool,
}

enum Sealer {
    PerCall { codec: Codec, passphrase: zeroize::Zeroizing<String> },
    Session(UnlockedSession),
}

impl Sealer {
    fn seal(&mut self, plaintext: &[u8]) -> vellum_core::Result<EncryptedEnvelope> {
        match self {
            Sealer::PerCall { codec, passphrase } => codec.encrypt(plaintext, passphrase),
            Sealer::Session(session) => session.seal(plaintext),
        }
    }
}

pub fn handle_seal(cli: &Cli, codec: Codec, args: SealArgs<'_>) -> anyhow::Result<()> {
    validate_inputs(&args)?;

    let passphrase = prompt_new_passphrase(is_interactive(cli.no_input))?;
    validate_passphrase(&passphrase)?;

    let mut sealer = if args.shared_salt && args.inputs.len() > 1 {
        Sealer::Session(codec.unlock(&passphrase)?)
    } else {
        Sealer::PerCall { codec, passphrase }
    };

    for input in args.inputs {
        let plaintext = read_input(input)?;
        let envelope = sealer.seal(&plaintext)?;
        let mut json = envelope.to_json()?;

        if is_stdio(input) {
            json.push('\n');
            write_output(args.output, json.as_bytes())?;
            continue;
        }

        let destination = args
            .output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| sealed_path(input));
        write_output(Some(&destination), json.as_bytes())?;
        tracing::info!(input = %input.display(), output = %destination.display(), "sealed");
        if !cli.quiet {
            println!("Sealed {} -> {}", input.display(), destination.display());
        }
    }

    Ok(())
}

fn validate_inputs(args: &SealArgs<'_>) -> anyhow::Result<()> {
    if args.output.is_some() && args.inputs.len() > 1 {
        return Err(CliError::invalid_input("--output requires a single input").into());
    }
    if args.inputs.len() > 1 && args.inputs.iter().any(|input| is_stdio(input)) {
        return Err(CliError::invalid_input("\"-\" (stdin) cannot be combined with other inputs").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_with_many_inputs_rejected() {
        let inputs = vec![PathBuf::from("a"), PathBuf::from("b")];
        let args = SealArgs {
            inputs: &inputs,
            output: Some(Path::new("out.json")),
            shared_salt: false,
        };
        assert!(validate_inputs(&args).is_err());
    }

    #[test]
    fn test_stdin_must_be_alone() {
        let inputs = vec![PathBuf::from("-"), PathBuf::from("b")];
        let args = SealArgs {
            inputs: &inputs,
            output: None,
            shared_salt: true,
        };
        assert!(validate_inputs(&args).is_err());

        let single = vec![PathBuf::from("-")];
        let args = SealArgs {
            inputs: &single,
            output: None,
            shared_salt: false,
        };
        assert!(validate_inputs(&args).is_ok());
    }
}
