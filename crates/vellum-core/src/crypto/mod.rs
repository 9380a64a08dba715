//! Cryptographic operations for Vellum.
//!
//! This module protects journal exports at rest using well-audited
//! primitives:
//! - **PBKDF2-HMAC-SHA256** or **Argon2id**: password key derivation
//! - **AES-256-GCM**: authenticated encryption
//!
//! ## Security Model
//!
//! - Fresh random 16-byte salt and 12-byte IV for every envelope
//! - Keys are derived per call and zeroized on drop; no session key is kept
//!   unless the caller explicitly unlocks one
//! - Wrong password and tampering fail identically
//! - Malformed envelopes are rejected before the KDF runs
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of an exported or persisted envelope
//! - Offline brute-force attacks on the password
//! - Tampering with stored envelopes
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to process memory during an unlocked session

pub mod codec;
pub mod envelope;
pub mod key;
pub mod passphrase;
pub mod session;

pub use codec::{decrypt, encrypt, Codec};
pub use envelope::{EncryptedEnvelope, EnvelopeVersion, IV_LENGTH, TAG_LENGTH};
pub use key::{derive_key, DerivedKey, KdfAlgorithm, KdfParams, SALT_LENGTH};
pub use passphrase::validate_passphrase;
pub use session::UnlockedSession;
