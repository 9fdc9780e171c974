//! Shared key fixtures for unit tests.
//!
//! RSA generation is slow, so each size is generated once per test binary.

use once_cell::sync::Lazy;
use rsa::RsaPrivateKey;

use crate::crypto::KeyPair;

/// Signing key. Its 256-byte signatures fit under the recipient's OAEP capacity.
pub static SIGNER_KEY: Lazy<RsaPrivateKey> = Lazy::new(|| generate(2048));

/// Recipient key, 318 bytes of OAEP capacity.
pub static RECIPIENT_KEY: Lazy<RsaPrivateKey> = Lazy::new(|| generate(3072));

fn generate(bits: usize) -> RsaPrivateKey {
    KeyPair::generate_with_bits(bits)
        .expect("test key generation")
        .private_key()
        .clone()
}
