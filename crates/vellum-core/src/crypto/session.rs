//! Opt-in unlocked session.
//!
//! A session derives its key once and reuses it under a single salt, with a
//! fresh random IV per envelope. It never holds the password and never
//! writes anything; the key is zeroized when the session is dropped.

use super::codec::{open_with_key, random_bytes, seal_with_key};
use super::envelope::{EncryptedEnvelope, EnvelopeVersion, IV_LENGTH};
use super::key::{DerivedKey, SALT_LENGTH};
use crate::error::{Result, VellumError};

/// Random 96-bit nonces stay collision-safe up to 2^32 messages per key.
const MAX_SEALS_PER_SESSION: u64 = 1 << 32;

/// A derived key held across several seal/open calls.
///
/// Created by [`Codec::unlock`](super::Codec::unlock).
pub struct UnlockedSession {
    version: EnvelopeVersion,
    salt: [u8; SALT_LENGTH],
    key: DerivedKey,
    sealed: u64,
}

impl UnlockedSession {
    pub(crate) fn new(version: EnvelopeVersion, salt: [u8; SALT_LENGTH], key: DerivedKey) -> Self {
        Self {
            version,
            salt,
            key,
            sealed: 0,
        }
    }

    /// Encrypt `plaintext` under the session key with a fresh IV.
    pub fn seal(&mut self, plaintext: &[u8]) -> Result<EncryptedEnvelope> {
        if self.sealed >= MAX_SEALS_PER_SESSION {
            return Err(VellumError::Crypto(
                "Session has sealed too many envelopes; unlock a new session".to_string(),
            ));
        }
        let iv = random_bytes::<IV_LENGTH>()?;
        let ciphertext = seal_with_key(&self.key, &iv, plaintext)?;
        self.sealed += 1;
        Ok(EncryptedEnvelope::from_parts(
            self.version,
            &ciphertext,
            &iv,
            &self.salt,
        ))
    }

    /// Decrypt an envelope sealed under this session's salt.
    ///
    /// Envelopes with a different salt or version fail with the same
    /// authentication error as a wrong password.
    pub fn open(&self, envelope: &EncryptedEnvelope) -> Result<Vec<u8>> {
        let decoded = envelope.decode()?;
        if decoded.version != self.version || decoded.salt != self.salt {
            tracing::warn!("envelope failed authentication");
            return Err(VellumError::Authentication);
        }
        open_with_key(&self.key, &decoded)
    }

    /// Number of envelopes sealed so far.
    pub fn sealed_count(&self) -> u64 {
        self.sealed
    }
}

impl std::fmt::Debug for UnlockedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockedSession")
            .field("version", &self.version)
            .field("key", &"[REDACTED]")
            .field("sealed", &self.sealed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Codec, KdfAlgorithm, KdfParams};

    const PASSPHRASE: &str = "session-passphrase-123";

    fn codec() -> Codec {
        Codec::new(KdfAlgorithm::Pbkdf2Sha256, KdfParams::low_cost())
    }

    #[test]
    fn test_session_round_trip() {
        let mut session = codec().unlock(PASSPHRASE).unwrap();
        let envelope = session.seal(b"first entry").unwrap();

        assert_eq!(session.open(&envelope).unwrap(), b"first entry");
        assert_eq!(session.sealed_count(), 1);
    }

    #[test]
    fn test_session_envelopes_share_salt_not_iv() {
        let mut session = codec().unlock(PASSPHRASE).unwrap();
        let first = session.seal(b"same").unwrap();
        let second = session.seal(b"same").unwrap();

        assert_eq!(first.salt, second.salt);
        assert_ne!(first.iv, second.iv);
        assert_ne!(first.ciphertext, second.ciphertext);
    }

    #[test]
    fn test_session_envelopes_open_with_password() {
        // Session output is an ordinary envelope.
        let mut session = codec().unlock(PASSPHRASE).unwrap();
        let envelope = session.seal(b"portable").unwrap();

        assert_eq!(codec().decrypt(&envelope, PASSPHRASE).unwrap(), b"portable");
    }

    #[test]
    fn test_session_rejects_foreign_salt() {
        let session = codec().unlock(PASSPHRASE).unwrap();
        let foreign = codec().encrypt(b"other", PASSPHRASE).unwrap();

        assert!(matches!(
            session.open(&foreign),
            Err(VellumError::Authentication)
        ));
    }

    #[test]
    fn test_session_rejects_malformed_envelope_structurally() {
        let mut session = codec().unlock(PASSPHRASE).unwrap();
        let mut envelope = session.seal(b"entry").unwrap();
        envelope.iv = "???".to_string();

        assert!(matches!(
            session.open(&envelope),
            Err(VellumError::Structural(_))
        ));
    }

    #[test]
    fn test_session_debug_redacts() {
        let session = codec().unlock(PASSPHRASE).unwrap();
        let output = format!("{:?}", session);
        assert!(output.contains("REDACTED"));
        assert!(!output.contains(PASSPHRASE));
    }
}
