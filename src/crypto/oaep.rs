//! RSA-OAEP encryption shared by seed provisioning and commit proofs.
//!
//! Both directions use SHA-256 for the label hash and MGF1-SHA256 for the
//! mask, with an empty label.

use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

/// Output size of the OAEP hash, in bytes.
pub const OAEP_HASH_LEN: usize = 32;

/// Maximum plaintext length for a modulus of `modulus_bytes` bytes.
///
/// `k - 2*hLen - 2`: 446 bytes for a 4096-bit key, 190 for 2048.
pub fn capacity(modulus_bytes: usize) -> usize {
    modulus_bytes.saturating_sub(2 * OAEP_HASH_LEN + 2)
}

/// Plaintext capacity of a specific public key.
pub fn capacity_of(key: &RsaPublicKey) -> usize {
    capacity(key.size())
}

fn padding() -> Oaep {
    Oaep::new::<Sha256>()
}

/// Encrypt `data` to `key`.
pub fn encrypt(key: &RsaPublicKey, data: &[u8]) -> rsa::Result<Vec<u8>> {
    key.encrypt(&mut OsRng, padding(), data)
}

/// Decrypt `ciphertext` with `key`.
///
/// Uses RSA blinding so the private exponentiation does not depend on the
/// attacker-supplied ciphertext in a measurable way.
pub fn decrypt(key: &RsaPrivateKey, ciphertext: &[u8]) -> rsa::Result<Vec<u8>> {
    key.decrypt_blinded(&mut OsRng, padding(), ciphertext)
}
