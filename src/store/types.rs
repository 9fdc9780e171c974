//! Data types for seed storage.
//!
//! Defines the validated seed value and the errors shared by every
//! seed store.

use std::path::PathBuf;

/// Length of a seed in hex characters.
pub const SEED_HEX_LEN: usize = 64;

/// Length of a seed in raw bytes.
pub const SEED_LEN: usize = SEED_HEX_LEN / 2;

/// The shared OTP secret: exactly 64 hex characters.
///
/// A `Seed` can only be built through validation, so holding one means the
/// value is well-formed. The original hex text is kept as given so a stored
/// seed reads back byte for byte.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed {
    hex: String,
    bytes: [u8; SEED_LEN],
}

impl Seed {
    /// Validate a seed exactly as supplied, with no trimming.
    pub fn parse(hex_seed: &str) -> Result<Self, SeedError> {
        if hex_seed.len() != SEED_HEX_LEN {
            return Err(SeedError::Format(format!(
                "expected {SEED_HEX_LEN} hex characters, got {}",
                hex_seed.len()
            )));
        }

        let mut bytes = [0u8; SEED_LEN];
        hex::decode_to_slice(hex_seed, &mut bytes)
            .map_err(|e| SeedError::Format(format!("not hexadecimal: {e}")))?;

        Ok(Self {
            hex: hex_seed.to_string(),
            bytes,
        })
    }

    /// Validate a seed read back from storage; surrounding whitespace is ignored.
    pub fn from_stored(contents: &str) -> Result<Self, SeedError> {
        Self::parse(contents.trim()).map_err(|e| match e {
            SeedError::Format(reason) => SeedError::Corrupt(reason),
            other => other,
        })
    }

    /// Decode a decrypted plaintext into a seed.
    pub fn from_plaintext(plaintext: &[u8]) -> Result<Self, SeedError> {
        let text = std::str::from_utf8(plaintext)
            .map_err(|_| SeedError::Format("plaintext is not UTF-8".into()))?;
        Self::parse(text)
    }

    pub fn as_hex(&self) -> &str {
        &self.hex
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seed([REDACTED])")
    }
}

/// Errors from seed provisioning and storage.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// Decryption succeeded but the plaintext is not a seed.
    #[error("invalid seed format: {0}")]
    Format(String),

    /// RSA-OAEP decryption itself failed.
    #[error("seed decryption failed: {0}")]
    Decrypt(String),

    #[error("no seed has been stored")]
    Unavailable,

    /// The persisted seed no longer validates.
    #[error("stored seed is corrupt: {0}")]
    Corrupt(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
