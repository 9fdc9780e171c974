//! Time-based one-time passwords derived from the active seed.
//!
//! Codes follow RFC 6238 with every parameter pinned here rather than taken
//! from a library default: HMAC-SHA1, 6 digits, 30-second steps, and a
//! verification window of one step on either side of the current one.
//!
//! The window means a code issued at the start of its step keeps verifying
//! for 60 seconds: the rest of its own step plus the following one. That is
//! the price of tolerating clock skew between the two parties; codes are not
//! tracked for replay.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::{Choice, ConstantTimeEq};

use crate::store::Seed;

/// Length of one time step, in seconds.
pub const TIME_STEP_SECS: u64 = 30;

/// Number of decimal digits in a code.
pub const CODE_DIGITS: usize = 6;

/// Steps accepted on each side of the current one during verification.
pub const VERIFY_WINDOW_STEPS: u64 = 1;

const CODE_MODULUS: u32 = 1_000_000;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

type HmacSha1 = Hmac<Sha1>;

/// A shared TOTP secret in its unpadded base32 form.
#[derive(Clone, PartialEq, Eq)]
pub struct Base32Secret {
    encoded: String,
    key: Vec<u8>,
}

impl Base32Secret {
    /// Wrap raw key bytes.
    pub fn from_bytes(key: &[u8]) -> Self {
        Self {
            encoded: base32_encode(key),
            key: key.to_vec(),
        }
    }

    /// Parse an unpadded (or `=`-padded) RFC 4648 base32 string.
    pub fn parse(encoded: &str) -> Result<Self, OtpError> {
        let key = base32_decode(encoded)?;
        Ok(Self::from_bytes(&key))
    }

    /// The base32 text, suitable for authenticator apps.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    fn key(&self) -> &[u8] {
        &self.key
    }
}

impl std::fmt::Debug for Base32Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Base32Secret([REDACTED])")
    }
}

/// A 6-digit code.
#[derive(Clone, PartialEq, Eq)]
pub struct TotpCode(String);

impl TotpCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TotpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Debug for TotpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TotpCode(******)")
    }
}

/// A code together with how long it stays current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub code: TotpCode,
    /// Seconds until the next step, in `1..=30`.
    pub valid_for: u64,
}

/// Derive the TOTP secret from a seed.
pub fn to_secret(seed: &Seed) -> Base32Secret {
    Base32Secret::from_bytes(seed.as_bytes())
}

/// Generate the code for unix time `time_t`.
pub fn generate(secret: &Base32Secret, time_t: u64) -> GeneratedCode {
    GeneratedCode {
        code: code_at(secret, time_t / TIME_STEP_SECS),
        valid_for: TIME_STEP_SECS - (time_t % TIME_STEP_SECS),
    }
}

/// Check a candidate code against the steps around `time_t`.
///
/// All window positions are computed and compared without early exit, and
/// each comparison is constant-time in the code content.
pub fn verify(secret: &Base32Secret, candidate: &str, time_t: u64) -> bool {
    let candidate = candidate.as_bytes();
    if candidate.len() != CODE_DIGITS || !candidate.iter().all(u8::is_ascii_digit) {
        return false;
    }

    let step = time_t / TIME_STEP_SECS;
    let first = step.saturating_sub(VERIFY_WINDOW_STEPS);
    let last = step.saturating_add(VERIFY_WINDOW_STEPS);

    let mut matched = Choice::from(0);
    for counter in first..=last {
        let expected = code_at(secret, counter);
        matched |= expected.0.as_bytes().ct_eq(candidate);
    }
    matched.into()
}

/// HOTP (RFC 4226) for a single counter value.
fn code_at(secret: &Base32Secret, counter: u64) -> TotpCode {
    let mut mac = HmacSha1::new_from_slice(secret.key()).expect("HMAC can take key of any size");
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);

    TotpCode(format!("{:0width$}", binary % CODE_MODULUS, width = CODE_DIGITS))
}

/// Unpadded RFC 4648 base32.
fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

fn base32_decode(encoded: &str) -> Result<Vec<u8>, OtpError> {
    let trimmed = encoded.trim().trim_end_matches('=');
    let mut out = Vec::with_capacity(trimmed.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for c in trimmed.chars() {
        let value = u8::try_from(c)
            .ok()
            .map(|b| b.to_ascii_uppercase())
            .and_then(|b| BASE32_ALPHABET.iter().position(|&a| a == b))
            .ok_or(OtpError::InvalidBase32(c))?;
        buffer = (buffer << 5) | value as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }
    Ok(out)
}

/// Errors from OTP secret handling.
#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("invalid base32 character {0:?}")]
    InvalidBase32(char),
}
