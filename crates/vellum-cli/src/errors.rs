//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use vellum_core::VellumError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, input file, etc.)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong passphrase, tampered envelope)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Requests were throttled
    RateLimited(String),

    /// Anything without a dedicated exit code
    Other(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message)
            | CliError::RateLimited(message)
            | CliError::Other(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::RateLimited(_) => exit_codes::RATE_LIMITED,
            CliError::Other(_) => exit_codes::GENERAL,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}

impl From<&VellumError> for CliError {
    fn from(err: &VellumError) -> Self {
        match err {
            VellumError::Structural(_)
            | VellumError::InvalidPassword(_)
            | VellumError::InvalidInput(_) => CliError::InvalidInput(err.to_string()),
            // No hint that could tell the two causes apart.
            VellumError::Authentication => CliError::AuthFailed {
                message: err.to_string(),
                hint: None,
            },
            VellumError::RateLimitExceeded => CliError::RateLimited(err.to_string()),
            VellumError::Io { source } if source.kind() == std::io::ErrorKind::NotFound => {
                CliError::not_found(err.to_string(), "Check the path and try again.")
            }
            VellumError::Crypto(_) | VellumError::Payload(_) | VellumError::Io { .. } => {
                CliError::Other(err.to_string())
            }
        }
    }
}

/// Resolve the exit behaviour for any error bubbling out of a command.
pub fn exit_with_error(err: anyhow::Error) -> ! {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        cli_err.exit()
    }
    if let Some(core_err) = err.downcast_ref::<VellumError>() {
        CliError::from(core_err).exit()
    }
    eprintln!("Error: {:#}", err);
    std::process::exit(super::constants::exit_codes::GENERAL)
}
