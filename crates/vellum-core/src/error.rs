//! Error types for Vellum core operations.
//!
//! Errors are descriptive at the core level where that is safe; the CLI
//! layer maps them to exit codes and user-facing messages. The
//! authentication and rate-limit variants deliberately carry no detail.

use thiserror::Error;

/// Result type alias for Vellum operations.
pub type Result<T> = std::result::Result<T, VellumError>;

/// Core error type for Vellum operations.
#[derive(Debug, Error)]
pub enum VellumError {
    /// Envelope is malformed; no cryptography was attempted.
    #[error("Invalid encrypted data format: {0}")]
    Structural(String),

    /// AEAD tag did not verify. Covers both a wrong password and tampering.
    #[error("Incorrect password or corrupted data")]
    Authentication,

    /// Caller identity has used up its budget for the current window.
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimitExceeded,

    /// Password rejected before any hashing work
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// Invalid configuration or parameter value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Random source or cipher setup failure
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Typed payload could not be serialized or parsed
    #[error("Payload error: {0}")]
    Payload(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl VellumError {
    /// Whether the error resolves on its own once the window elapses.
    pub fn is_transient(&self) -> bool {
        matches!(self, VellumError::RateLimitExceeded)
    }
}
