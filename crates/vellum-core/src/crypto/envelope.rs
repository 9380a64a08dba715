//! Encrypted envelope format.
//!
//! An envelope is the only thing ever written to storage or export files:
//!
//! ```json
//! { "ct": "<base64 ciphertext + tag>", "iv": "<base64 12 bytes>", "s": "<base64 16 bytes>" }
//! ```
//!
//! Version 1 envelopes (PBKDF2) carry exactly those three fields. Version 2
//! envelopes (Argon2id) add `"v": 2`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::key::{KdfAlgorithm, SALT_LENGTH};
use crate::error::{Result, VellumError};

/// Length of the AES-GCM nonce in bytes.
pub const IV_LENGTH: usize = 12;

/// Length of the AES-GCM authentication tag appended to the ciphertext.
pub const TAG_LENGTH: usize = 16;

/// Envelope format version. Selects the key derivation algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeVersion {
    /// PBKDF2-HMAC-SHA256; serialized without a version field.
    V1,
    /// Argon2id.
    V2,
}

impl EnvelopeVersion {
    pub fn for_algorithm(algorithm: KdfAlgorithm) -> Self {
        match algorithm {
            KdfAlgorithm::Pbkdf2Sha256 => EnvelopeVersion::V1,
            KdfAlgorithm::Argon2id => EnvelopeVersion::V2,
        }
    }

    pub fn algorithm(self) -> KdfAlgorithm {
        match self {
            EnvelopeVersion::V1 => KdfAlgorithm::Pbkdf2Sha256,
            EnvelopeVersion::V2 => KdfAlgorithm::Argon2id,
        }
    }

    fn to_wire(self) -> Option<u8> {
        match self {
            EnvelopeVersion::V1 => None,
            EnvelopeVersion::V2 => Some(2),
        }
    }

    fn from_wire(value: Option<u8>) -> Result<Self> {
        match value {
            None | Some(1) => Ok(EnvelopeVersion::V1),
            Some(2) => Ok(EnvelopeVersion::V2),
            Some(other) => Err(VellumError::Structural(format!(
                "unsupported envelope version {}",
                other
            ))),
        }
    }
}

/// Persisted bundle of ciphertext plus the parameters needed to open it.
///
/// All byte fields are standard base64. Missing fields deserialize as empty
/// strings and are reported as structural errors on decrypt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// AEAD output: ciphertext followed by the 16-byte tag.
    #[serde(rename = "ct", default)]
    pub ciphertext: String,

    /// 12-byte nonce.
    #[serde(default)]
    pub iv: String,

    /// 16-byte KDF salt.
    #[serde(rename = "s", default)]
    pub salt: String,

    /// Format version; absent for version 1.
    #[serde(rename = "v", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u8>,
}

/// Envelope fields after structural validation.
pub(crate) struct DecodedEnvelope {
    pub version: EnvelopeVersion,
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_LENGTH],
    pub salt: [u8; SALT_LENGTH],
}

impl EncryptedEnvelope {
    pub(crate) fn from_parts(
        version: EnvelopeVersion,
        ciphertext: &[u8],
        iv: &[u8; IV_LENGTH],
        salt: &[u8; SALT_LENGTH],
    ) -> Self {
        Self {
            ciphertext: STANDARD.encode(ciphertext),
            iv: STANDARD.encode(iv),
            salt: STANDARD.encode(salt),
            version: version.to_wire(),
        }
    }

    /// Parse an envelope from its JSON form.
    ///
    /// Anything that is not a JSON object is a structural error. Field
    /// contents are not checked until [`EncryptedEnvelope::validate`] or
    /// decrypt.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| VellumError::Structural(format!("not valid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(VellumError::Structural(
                "envelope must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| VellumError::Structural(e.to_string()))
    }

    /// Serialize the envelope to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| VellumError::Payload(e.to_string()))
    }

    /// Format version named by the envelope.
    pub fn format_version(&self) -> Result<EnvelopeVersion> {
        EnvelopeVersion::from_wire(self.version)
    }

    /// Check the envelope is well formed without running any cryptography.
    pub fn validate(&self) -> Result<()> {
        self.decode().map(|_| ())
    }

    pub(crate) fn decode(&self) -> Result<DecodedEnvelope> {
        let version = self.format_version()?;
        let ciphertext = decode_field("ct", &self.ciphertext)?;
        let iv = decode_fixed::<IV_LENGTH>("iv", &self.iv)?;
        let salt = decode_fixed::<SALT_LENGTH>("s", &self.salt)?;

        if ciphertext.len() < TAG_LENGTH {
            return Err(VellumError::Structural(format!(
                "field `ct` is {} bytes, shorter than the {}-byte tag",
                ciphertext.len(),
                TAG_LENGTH
            )));
        }

        Ok(DecodedEnvelope {
            version,
            ciphertext,
            iv,
            salt,
        })
    }
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>> {
    if value.is_empty() {
        return Err(VellumError::Structural(format!("missing field `{}`", name)));
    }
    STANDARD
        .decode(value.as_bytes())
        .map_err(|e| VellumError::Structural(format!("field `{}` is not valid base64: {}", name, e)))
}

fn decode_fixed<const N: usize>(name: &str, value: &str) -> Result<[u8; N]> {
    let bytes = decode_field(name, value)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        VellumError::Structural(format!(
            "field `{}` must decode to {} bytes (got {})",
            name, N, len
        ))
    })
}
