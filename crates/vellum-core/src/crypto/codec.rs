//! Authenticated envelope encryption.
//!
//! Every call is independent: a fresh salt and IV are generated, the key is
//! derived, used once, and zeroized. Structural problems with an envelope
//! are reported before the (deliberately slow) KDF runs.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use super::envelope::{DecodedEnvelope, EncryptedEnvelope, EnvelopeVersion, IV_LENGTH};
use super::key::{derive_key, DerivedKey, KdfAlgorithm, KdfParams, SALT_LENGTH};
use super::session::UnlockedSession;
use crate::error::{Result, VellumError};

/// Password-based envelope codec.
///
/// Holds only configuration, so one codec can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    algorithm: KdfAlgorithm,
    params: KdfParams,
}

impl Codec {
    pub fn new(algorithm: KdfAlgorithm, params: KdfParams) -> Self {
        Self { algorithm, params }
    }

    /// Algorithm used for new envelopes.
    pub fn algorithm(&self) -> KdfAlgorithm {
        self.algorithm
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Encrypt `plaintext` under `password`.
    ///
    /// The ciphertext is `plaintext.len() + 16` bytes (AES-GCM tag).
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum_core::crypto::{Codec, KdfAlgorithm, KdfParams};
    ///
    /// let codec = Codec::new(KdfAlgorithm::Pbkdf2Sha256, KdfParams::low_cost());
    /// let envelope = codec.encrypt(b"secret data", "my-secure-passphrase").unwrap();
    /// assert!(envelope.validate().is_ok());
    /// ```
    pub fn encrypt(&self, plaintext: &[u8], password: &str) -> Result<EncryptedEnvelope> {
        let salt = random_bytes::<SALT_LENGTH>()?;
        let iv = random_bytes::<IV_LENGTH>()?;
        let key = derive_key(password, &salt, self.algorithm, &self.params)?;
        let ciphertext = seal_with_key(&key, &iv, plaintext)?;

        Ok(EncryptedEnvelope::from_parts(
            EnvelopeVersion::for_algorithm(self.algorithm),
            &ciphertext,
            &iv,
            &salt,
        ))
    }

    /// Decrypt an envelope with `password`.
    ///
    /// # Errors
    ///
    /// - `VellumError::Structural` if the envelope is malformed (checked
    ///   before key derivation)
    /// - `VellumError::Authentication` if the password is wrong or any of
    ///   the ciphertext, IV or salt were altered
    pub fn decrypt(&self, envelope: &EncryptedEnvelope, password: &str) -> Result<Vec<u8>> {
        let decoded = envelope.decode()?;
        let key = derive_key(
            password,
            &decoded.salt,
            decoded.version.algorithm(),
            &self.params,
        )?;
        open_with_key(&key, &decoded)
    }

    /// Serialize `value` as JSON and encrypt it.
    pub fn encrypt_json<T: Serialize + ?Sized>(
        &self,
        value: &T,
        password: &str,
    ) -> Result<EncryptedEnvelope> {
        let bytes = Zeroizing::new(
            serde_json::to_vec(value).map_err(|e| VellumError::Payload(e.to_string()))?,
        );
        self.encrypt(&bytes, password)
    }

    /// Decrypt an envelope and parse the plaintext as JSON.
    pub fn decrypt_json<T: DeserializeOwned>(
        &self,
        envelope: &EncryptedEnvelope,
        password: &str,
    ) -> Result<T> {
        let bytes = Zeroizing::new(self.decrypt(envelope, password)?);
        serde_json::from_slice(&bytes).map_err(|e| VellumError::Payload(e.to_string()))
    }

    /// Derive a key once and keep it for several seal/open calls.
    ///
    /// This trades the per-call key lifetime for a single KDF cost. The key
    /// stays in memory until the session is dropped.
    pub fn unlock(&self, password: &str) -> Result<UnlockedSession> {
        let salt = random_bytes::<SALT_LENGTH>()?;
        let key = derive_key(password, &salt, self.algorithm, &self.params)?;
        Ok(UnlockedSession::new(
            EnvelopeVersion::for_algorithm(self.algorithm),
            salt,
            key,
        ))
    }
}

/// Encrypt with default parameters (PBKDF2-HMAC-SHA256, 100,000 iterations).
pub fn encrypt(plaintext: &[u8], password: &str) -> Result<EncryptedEnvelope> {
    Codec::default().encrypt(plaintext, password)
}

/// Decrypt with default parameters.
pub fn decrypt(envelope: &EncryptedEnvelope, password: &str) -> Result<Vec<u8>> {
    Codec::default().decrypt(envelope, password)
}

pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| VellumError::Crypto(format!("Failed to generate random bytes: {}", e)))?;
    Ok(bytes)
}

fn cipher(key: &DerivedKey) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VellumError::Crypto(format!("Failed to create cipher: {}", e)))
}

pub(crate) fn seal_with_key(
    key: &DerivedKey,
    iv: &[u8; IV_LENGTH],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    cipher(key)?
        .encrypt(Nonce::from_slice(iv), plaintext)
        .map_err(|e| VellumError::Crypto(format!("Encryption failed: {}", e)))
}

pub(crate) fn open_with_key(key: &DerivedKey, decoded: &DecodedEnvelope) -> Result<Vec<u8>> {
    cipher(key)?
        .decrypt(Nonce::from_slice(&decoded.iv), decoded.ciphertext.as_slice())
        .map_err(|_| {
            tracing::warn!("envelope failed authentication");
            VellumError::Authentication
        })
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::Deserialize;

    use super::*;
    use crate::crypto::TAG_LENGTH;

    const PASSPHRASE: &str = "test-passphrase-secure-123";

    fn codec() -> Codec {
        Codec::new(KdfAlgorithm::Pbkdf2Sha256, KdfParams::low_cost())
    }

    fn decoded_len(field: &str) -> usize {
        STANDARD.decode(field).unwrap().len()
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let plaintext = b"Hello, World! This is secret data.";

        let envelope = codec().encrypt(plaintext, PASSPHRASE).unwrap();
        let decrypted = codec().decrypt(&envelope, PASSPHRASE).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_argon2id_round_trip() {
        let codec = Codec::new(KdfAlgorithm::Argon2id, KdfParams::low_cost());
        let envelope = codec.encrypt(b"argon", PASSPHRASE).unwrap();

        assert_eq!(envelope.version, Some(2));
        assert_eq!(codec.decrypt(&envelope, PASSPHRASE).unwrap(), b"argon");
    }

    #[test]
    fn test_version_selects_algorithm_on_decrypt() {
        // A PBKDF2 codec still opens Argon2id envelopes: the envelope decides.
        let argon = Codec::new(KdfAlgorithm::Argon2id, KdfParams::low_cost());
        let envelope = argon.encrypt(b"portable", PASSPHRASE).unwrap();
        assert_eq!(codec().decrypt(&envelope, PASSPHRASE).unwrap(), b"portable");
    }

    #[test]
    fn test_envelope_field_lengths() {
        let plaintext = vec![0x42u8; 37];
        let envelope = codec().encrypt(&plaintext, PASSPHRASE).unwrap();

        assert_eq!(decoded_len(&envelope.ciphertext), plaintext.len() + TAG_LENGTH);
        assert_eq!(decoded_len(&envelope.iv), IV_LENGTH);
        assert_eq!(decoded_len(&envelope.salt), SALT_LENGTH);
        assert_eq!(envelope.version, None);
    }

    #[test]
    fn test_empty_data_encryption() {
        let envelope = codec().encrypt(b"", PASSPHRASE).unwrap();
        assert_eq!(decoded_len(&envelope.ciphertext), TAG_LENGTH);
        assert!(codec().decrypt(&envelope, PASSPHRASE).unwrap().is_empty());
    }

    #[test]
    fn test_large_data_encryption() {
        let plaintext = vec![0x42u8; 1024 * 1024];

        let envelope = codec().encrypt(&plaintext, PASSPHRASE).unwrap();
        let decrypted = codec().decrypt(&envelope, PASSPHRASE).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_wrong_passphrase_fails_decryption() {
        let envelope = codec().encrypt(b"secret data", "correct-passphrase-123").unwrap();

        let result = codec().decrypt(&envelope, "wrong-passphrase-456");
        assert!(matches!(result, Err(VellumError::Authentication)));
    }

    #[test]
    fn test_empty_password_rejected_on_encrypt() {
        let result = codec().encrypt(b"secret data", "");
        assert!(matches!(result, Err(VellumError::InvalidPassword(_))));
    }

    #[test]
    fn test_same_input_encrypts_differently() {
        let first = codec().encrypt(b"same plaintext", PASSPHRASE).unwrap();
        let second = codec().encrypt(b"same plaintext", PASSPHRASE).unwrap();

        assert_ne!(first.salt, second.salt);
        assert_ne!(first.iv, second.iv);
        assert_ne!(first.ciphertext, second.ciphertext);
    }

    #[test]
    fn test_structural_error_wins_over_password_check() {
        // Malformed input is reported even with an empty password, proving
        // the envelope is inspected before any key derivation.
        let envelope = EncryptedEnvelope {
            ciphertext: String::new(),
            iv: String::new(),
            salt: String::new(),
            version: None,
        };
        let result = codec().decrypt(&envelope, "");
        assert!(matches!(result, Err(VellumError::Structural(_))));
    }

    #[test]
    fn test_structural_error_skips_expensive_kdf() {
        // Full-cost Argon2id would take noticeable time; a malformed envelope
        // must come back without paying it.
        let expensive = Codec::new(
            KdfAlgorithm::Argon2id,
            KdfParams {
                argon2_memory_kib: 256 * 1024,
                argon2_iterations: 8,
                ..KdfParams::default()
            },
        );
        let envelope = EncryptedEnvelope {
            ciphertext: "%%%".to_string(),
            iv: "AQEBAQEBAQEBAQEB".to_string(),
            salt: "AgICAgICAgICAgICAgICAg==".to_string(),
            version: Some(2),
        };

        let started = std::time::Instant::now();
        let result = expensive.decrypt(&envelope, PASSPHRASE);
        assert!(matches!(result, Err(VellumError::Structural(_))));
        assert!(started.elapsed() < std::time::Duration::from_millis(200));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Inventory {
        name: String,
        resentments: Vec<String>,
    }

    #[test]
    fn test_json_payload_round_trip() {
        let inventory = Inventory {
            name: "Test User".to_string(),
            resentments: vec!["Boss".to_string(), "Landlord".to_string()],
        };

        let envelope = codec().encrypt_json(&inventory, PASSPHRASE).unwrap();
        let decrypted: Inventory = codec().decrypt_json(&envelope, PASSPHRASE).unwrap();

        assert_eq!(decrypted, inventory);
    }

    #[test]
    fn test_json_payload_parse_failure_is_payload_error() {
        let envelope = codec().encrypt(b"not json at all", PASSPHRASE).unwrap();
        let result: Result<Inventory> = codec().decrypt_json(&envelope, PASSPHRASE);
        assert!(matches!(result, Err(VellumError::Payload(_))));
    }

    #[test]
    fn test_json_payload_wrong_password_is_authentication_error() {
        let envelope = codec().encrypt_json(&vec![1, 2, 3], PASSPHRASE).unwrap();
        let result: Result<Vec<u32>> = codec().decrypt_json(&envelope, "wrong-passphrase");
        assert!(matches!(result, Err(VellumError::Authentication)));
    }
}
