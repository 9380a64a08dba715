//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells, and by clap)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Unclassified failure.
    pub const GENERAL: i32 = 1;

    /// Resource not found (config, input file, envelope).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input, arguments, or malformed envelope.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase or tampered envelope).
    pub const AUTH_FAILED: i32 = 5;

    /// At least one request was throttled.
    pub const RATE_LIMITED: i32 = 6;
}

/// Passphrase environment variable.
pub const PASSPHRASE_ENV: &str = "VELLUM_PASSPHRASE";

/// Suffix appended to input paths for sealed output.
pub const SEALED_SUFFIX: &str = ".vellum.json";

/// Interactive attempts before `open` gives up.
pub const MAX_PASSPHRASE_ATTEMPTS: u32 = 3;
