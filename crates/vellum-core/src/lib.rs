//! # Vellum Core
//!
//! Core library for Vellum - the trust boundary of a local-first journal.
//!
//! This crate holds the two pieces of the journal that guard something:
//! encryption of exported/persisted journal content, and a request limiter
//! in front of the expensive generation endpoint. Everything else (UI,
//! tables, transport) treats their output as opaque bytes.
//!
//! ## Architecture
//!
//! - **crypto**: key derivation, envelope format, and authenticated
//!   encrypt/decrypt
//! - **rate_limit**: sliding-window request limiter keyed by caller identity
//! - **fs**: atomic file writes for exported envelopes
//!
//! ## Example
//!
//! ```
//! use vellum_core::crypto::{Codec, KdfAlgorithm, KdfParams};
//!
//! let codec = Codec::new(KdfAlgorithm::Pbkdf2Sha256, KdfParams::low_cost());
//! let envelope = codec.encrypt(b"dear diary", "correct horse battery").unwrap();
//! let plaintext = codec.decrypt(&envelope, "correct horse battery").unwrap();
//! assert_eq!(plaintext, b"dear diary");
//! ```

pub mod crypto;
pub mod error;
pub mod fs;
pub mod rate_limit;

pub use crypto::{Codec, EncryptedEnvelope};
pub use error::{Result, VellumError};
pub use rate_limit::{RateLimitConfig, RateLimiter};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
