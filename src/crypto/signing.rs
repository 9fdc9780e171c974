//! Commit hash signing and proof encryption.
//!
//! A proof is an RSA-PSS signature over the ASCII commit hash, encrypted to a
//! recipient with RSA-OAEP so only they can read and check it.
//!
//! With equal key sizes the signature (`k` bytes) never fits in the
//! recipient's OAEP capacity (`k - 66` bytes). That case is reported as
//! [`ProofError::EncryptionCapacityExceeded`] rather than worked around with
//! hybrid encryption, which would change the output format.

use base64::Engine;
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::crypto::oaep;

/// Length of a commit hash in hex characters.
pub const COMMIT_HASH_LEN: usize = 40;

const PSS_HASH_LEN: usize = 32;

/// A validated 40-character hex commit hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitHash(String);

impl CommitHash {
    pub fn parse(hash: &str) -> Result<Self, ProofError> {
        if hash.len() != COMMIT_HASH_LEN || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ProofError::InvalidCommitHash(hash.to_string()));
        }
        Ok(Self(hash.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommitHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw RSA-PSS signature bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);

/// RSA-OAEP ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob(pub Vec<u8>);

impl EncryptedBlob {
    /// Standard base64 with padding, single line.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.0)
    }
}

/// A signed, encrypted commit proof.
#[derive(Debug, Clone)]
pub struct Proof {
    pub commit_hash: CommitHash,
    pub signature: Signature,
    pub encrypted_signature: EncryptedBlob,
    pub encrypted_signature_b64: String,
}

/// Largest PSS salt the key allows: `emLen - hLen - 2`.
fn max_salt_len(key: &impl PublicKeyParts) -> usize {
    key.size().saturating_sub(PSS_HASH_LEN + 2)
}

/// Sign a commit hash with RSA-PSS (SHA-256, maximum salt length).
///
/// The hash is validated before any key material is touched.
pub fn sign(commit_hash: &str, key: &RsaPrivateKey) -> Result<Signature, ProofError> {
    let hash = CommitHash::parse(commit_hash)?;
    sign_commit(&hash, key)
}

/// Sign an already validated commit hash.
pub fn sign_commit(hash: &CommitHash, key: &RsaPrivateKey) -> Result<Signature, ProofError> {
    let digest = Sha256::digest(hash.as_str().as_bytes());
    let padding = Pss::new_with_salt::<Sha256>(max_salt_len(key));

    key.sign_with_rng(&mut OsRng, padding, &digest)
        .map(Signature)
        .map_err(|e| ProofError::Signing(e.to_string()))
}

/// Check a signature over a commit hash.
pub fn verify(commit_hash: &str, signature: &Signature, key: &RsaPublicKey) -> bool {
    let digest = Sha256::digest(commit_hash.as_bytes());
    let padding = Pss::new_with_salt::<Sha256>(max_salt_len(key));
    key.verify(padding, &digest, &signature.0).is_ok()
}

/// Encrypt a signature to a recipient.
pub fn encrypt_for(
    signature: &Signature,
    recipient: &RsaPublicKey,
) -> Result<EncryptedBlob, ProofError> {
    let capacity = oaep::capacity_of(recipient);
    if signature.0.len() > capacity {
        return Err(ProofError::EncryptionCapacityExceeded {
            signature_len: signature.0.len(),
            capacity,
        });
    }

    oaep::encrypt(recipient, &signature.0)
        .map(EncryptedBlob)
        .map_err(|e| ProofError::Encryption(e.to_string()))
}

/// Recover a signature from an encrypted blob (recipient side).
pub fn decrypt_signature(
    blob: &EncryptedBlob,
    key: &RsaPrivateKey,
) -> Result<Signature, ProofError> {
    oaep::decrypt(key, &blob.0)
        .map(Signature)
        .map_err(|e| ProofError::Decryption(e.to_string()))
}

/// Sign `commit_hash` and encrypt the signature for `recipient`.
pub fn produce_proof(
    commit_hash: &str,
    key: &RsaPrivateKey,
    recipient: &RsaPublicKey,
) -> Result<Proof, ProofError> {
    let commit_hash = CommitHash::parse(commit_hash)?;
    let signature = sign_commit(&commit_hash, key)?;
    let encrypted_signature = encrypt_for(&signature, recipient)?;
    let encrypted_signature_b64 = encrypted_signature.to_base64();

    tracing::debug!(
        commit = %commit_hash,
        signature_len = signature.0.len(),
        "Produced commit proof"
    );

    Ok(Proof {
        commit_hash,
        signature,
        encrypted_signature,
        encrypted_signature_b64,
    })
}

/// Errors that can occur while producing or checking a proof.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("commit hash must be {COMMIT_HASH_LEN} hex characters, got {0:?}")]
    InvalidCommitHash(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error(
        "signature is {signature_len} bytes but the recipient key can encrypt at most {capacity}"
    )]
    EncryptionCapacityExceeded { signature_len: usize, capacity: usize },

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RECIPIENT_KEY, SIGNER_KEY};

    const HASH: &str = "3f786850e387550fdab836ed7e6dc881de23001b";

    #[test]
    fn test_commit_hash_validation() {
        assert!(CommitHash::parse(HASH).is_ok());
        assert!(CommitHash::parse(&HASH.to_uppercase()).is_ok());
        assert!(CommitHash::parse(&HASH[..39]).is_err());
        assert!(CommitHash::parse(&format!("{HASH}a")).is_err());
        assert!(CommitHash::parse(&HASH.replace('3', "g")).is_err());
        assert!(CommitHash::parse("").is_err());
    }

    #[test]
    fn test_sign_rejects_bad_length() {
        for bad in [&HASH[..39], &format!("{HASH}0")[..], &HASH.replace('f', "z")[..]] {
            assert!(matches!(
                sign(bad, &SIGNER_KEY),
                Err(ProofError::InvalidCommitHash(_))
            ));
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let signature = sign(HASH, &SIGNER_KEY).unwrap();
        let public = SIGNER_KEY.to_public_key();

        assert_eq!(signature.0.len(), public.size());
        assert!(verify(HASH, &signature, &public));
        assert!(!verify(&HASH.replace('3', "4"), &signature, &public));
    }

    #[test]
    fn test_signatures_are_randomized() {
        let first = sign(HASH, &SIGNER_KEY).unwrap();
        let second = sign(HASH, &SIGNER_KEY).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_with_wrong_key() {
        let signature = sign(HASH, &SIGNER_KEY).unwrap();
        assert!(!verify(HASH, &signature, &RECIPIENT_KEY.to_public_key()));
    }

    #[test]
    fn test_equal_key_sizes_exceed_capacity() {
        let err = produce_proof(HASH, &SIGNER_KEY, &SIGNER_KEY.to_public_key()).unwrap_err();
        match err {
            ProofError::EncryptionCapacityExceeded {
                signature_len,
                capacity,
            } => {
                assert_eq!(signature_len, 256);
                assert_eq!(capacity, 190);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_proof_roundtrip() {
        let proof = produce_proof(HASH, &SIGNER_KEY, &RECIPIENT_KEY.to_public_key()).unwrap();
        assert_eq!(proof.commit_hash.as_str(), HASH);
        assert!(!proof.encrypted_signature_b64.contains('\n'));

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&proof.encrypted_signature_b64)
            .unwrap();
        let recovered = decrypt_signature(&EncryptedBlob(decoded), &RECIPIENT_KEY).unwrap();

        assert_eq!(recovered, proof.signature);
        assert!(verify(HASH, &recovered, &SIGNER_KEY.to_public_key()));
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let proof = produce_proof(HASH, &SIGNER_KEY, &RECIPIENT_KEY.to_public_key()).unwrap();
        assert!(matches!(
            decrypt_signature(&proof.encrypted_signature, &SIGNER_KEY),
            Err(ProofError::Decryption(_))
        ));
    }
}
