//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use vellum_core::crypto::KdfAlgorithm;
use vellum_core::VERSION;

/// Vellum - password-sealed journal exports and request throttling
#[derive(Parser)]
#[command(name = "vellum")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, env = "VELLUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_input: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt files into envelopes
    Seal {
        /// Files to seal ("-" reads stdin and writes the envelope to stdout)
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Output path (single input only)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Derive the key once and share one salt across all inputs
        #[arg(long)]
        shared_salt: bool,

        /// Key derivation algorithm (overrides config)
        #[arg(long, value_enum)]
        kdf: Option<KdfArg>,
    },

    /// Decrypt an envelope
    Open {
        /// Envelope file ("-" reads stdin)
        #[arg(value_name = "ENVELOPE")]
        envelope: PathBuf,

        /// Write plaintext here instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Check an envelope is well formed without decrypting it
    Verify {
        /// Envelope file ("-" reads stdin)
        #[arg(value_name = "ENVELOPE")]
        envelope: PathBuf,
    },

    /// Replay identities from stdin through a rate limiter
    Throttle {
        /// Requests allowed per identity per window (overrides config)
        #[arg(long)]
        limit: Option<usize>,

        /// Window length in milliseconds (overrides config)
        #[arg(long, value_name = "MS")]
        window_ms: Option<u64>,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KdfArg {
    Pbkdf2Sha256,
    Argon2id,
}

impl From<KdfArg> for KdfAlgorithm {
    fn from(value: KdfArg) -> Self {
        match value {
            KdfArg::Pbkdf2Sha256 => KdfAlgorithm::Pbkdf2Sha256,
            KdfArg::Argon2id => KdfAlgorithm::Argon2id,
        }
    }
}
