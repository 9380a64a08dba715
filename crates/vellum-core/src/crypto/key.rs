//! Key derivation from passwords.
//!
//! Two iterated password-hashing functions are supported. PBKDF2-HMAC-SHA256
//! is the baseline used by existing exports; Argon2id is memory-hard and
//! resistant to GPU-based attacks. Both have tunable cost.

use argon2::Argon2;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, VellumError};

/// Length of the per-envelope salt in bytes.
pub const SALT_LENGTH: usize = 16;

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256).
pub(crate) const KEY_LENGTH: usize = 32;

const PBKDF2_ITERATIONS: u32 = 100_000;

/// Argon2id defaults:
/// - Memory: 64 MB (64 * 1024 KB)
/// - Iterations: 3
/// - Parallelism: 1
const ARGON2_MEMORY_KB: u32 = 64 * 1024;
const ARGON2_ITERATIONS: u32 = 3;
const ARGON2_PARALLELISM: u32 = 1;

/// Password hashing algorithm used to derive an envelope key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KdfAlgorithm {
    /// PBKDF2 with HMAC-SHA256.
    #[default]
    Pbkdf2Sha256,
    /// Argon2id, version 0x13.
    Argon2id,
}

impl std::fmt::Display for KdfAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KdfAlgorithm::Pbkdf2Sha256 => write!(f, "pbkdf2_sha256"),
            KdfAlgorithm::Argon2id => write!(f, "argon2id"),
        }
    }
}

/// Cost parameters for both supported algorithms.
///
/// The parameters are not stored in envelopes; the same values must be used
/// to open an envelope as were used to seal it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub pbkdf2_iterations: u32,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: PBKDF2_ITERATIONS,
            argon2_memory_kib: ARGON2_MEMORY_KB,
            argon2_iterations: ARGON2_ITERATIONS,
            argon2_parallelism: ARGON2_PARALLELISM,
        }
    }
}

impl KdfParams {
    /// Cheap parameters for tests and development fixtures.
    ///
    /// Never use these for data that matters: they make brute force cheap.
    pub fn low_cost() -> Self {
        Self {
            pbkdf2_iterations: 1_000,
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            argon2_parallelism: 1,
        }
    }

    /// Check that the parameters are usable for `algorithm`.
    pub fn validate(&self, algorithm: KdfAlgorithm) -> Result<()> {
        match algorithm {
            KdfAlgorithm::Pbkdf2Sha256 => {
                if self.pbkdf2_iterations == 0 {
                    return Err(VellumError::InvalidInput(
                        "PBKDF2 iterations must be greater than zero".to_string(),
                    ));
                }
                Ok(())
            }
            KdfAlgorithm::Argon2id => self.argon2_params().map(|_| ()),
        }
    }

    fn argon2_params(&self) -> Result<argon2::Params> {
        argon2::Params::new(
            self.argon2_memory_kib,
            self.argon2_iterations,
            self.argon2_parallelism,
            Some(KEY_LENGTH),
        )
        .map_err(|e| VellumError::InvalidInput(format!("Invalid Argon2 params: {}", e)))
    }
}

/// A cryptographic key derived from a password.
///
/// The raw bytes never leave the crate. Not `Clone`, and zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive an encryption key from a password and salt.
///
/// # Security
///
/// - Same password + salt + params always produces the same key
/// - A different salt produces a different key
/// - An empty password is rejected before any hashing work
///
/// # Examples
///
/// ```
/// use vellum_core::crypto::{derive_key, KdfAlgorithm, KdfParams};
///
/// let salt = [7u8; 16];
/// let key = derive_key("my-passphrase", &salt, KdfAlgorithm::Pbkdf2Sha256, &KdfParams::low_cost());
/// assert!(key.is_ok());
/// ```
pub fn derive_key(
    password: &str,
    salt: &[u8; SALT_LENGTH],
    algorithm: KdfAlgorithm,
    params: &KdfParams,
) -> Result<DerivedKey> {
    if password.is_empty() {
        return Err(VellumError::InvalidPassword(
            "Password cannot be empty".to_string(),
        ));
    }
    params.validate(algorithm)?;

    tracing::debug!(%algorithm, "deriving envelope key");

    let mut key = DerivedKey {
        key: [0u8; KEY_LENGTH],
    };
    match algorithm {
        KdfAlgorithm::Pbkdf2Sha256 => {
            pbkdf2::pbkdf2_hmac::<Sha256>(
                password.as_bytes(),
                salt,
                params.pbkdf2_iterations,
                &mut key.key,
            );
        }
        KdfAlgorithm::Argon2id => {
            let argon2 = Argon2::new(
                argon2::Algorithm::Argon2id,
                argon2::Version::V0x13,
                params.argon2_params()?,
            );
            argon2
                .hash_password_into(password.as_bytes(), salt, &mut key.key)
                .map_err(|e| VellumError::Crypto(format!("Key derivation failed: {}", e)))?;
        }
    }

    Ok(key)
}
