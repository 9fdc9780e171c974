//! Cryptography module for authproof.
//!
//! Provides:
//! - RSA key generation and PEM storage
//! - RSA-OAEP encryption shared by seed provisioning and proofs
//! - TOTP derivation and verification
//! - Commit hash signing and proof encryption

pub mod keys;
pub mod oaep;
pub mod otp;
pub mod signing;

pub use keys::*;
pub use otp::{Base32Secret, GeneratedCode, OtpError, TotpCode};
pub use signing::{CommitHash, EncryptedBlob, Proof, ProofError, Signature};
