//! Seed provisioning on top of a [`SeedStore`].

use super::seed_store::SeedStore;
use super::types::{Seed, SeedError};
use crate::crypto::oaep;
use rsa::RsaPrivateKey;
use std::sync::Mutex;

/// Validates and persists the single active seed.
///
/// Writes are serialized by an internal lock; reads go straight to the
/// store, whose atomic replace keeps them consistent.
pub struct SeedVault {
    store: Box<dyn SeedStore>,
    write_lock: Mutex<()>,
}

impl SeedVault {
    pub fn new(store: impl SeedStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            write_lock: Mutex::new(()),
        }
    }

    /// Decrypt an RSA-OAEP seed blob and make it the active seed.
    ///
    /// The plaintext must be exactly 64 hex characters. Anything else fails
    /// with [`SeedError::Format`] and the stored seed is left as it was.
    pub fn decrypt_and_store(
        &self,
        ciphertext: &[u8],
        key: &RsaPrivateKey,
    ) -> Result<(), SeedError> {
        let plaintext =
            oaep::decrypt(key, ciphertext).map_err(|e| SeedError::Decrypt(e.to_string()))?;
        let seed = Seed::from_plaintext(&plaintext)?;

        // The guard protects no data, so a poisoned lock is still usable.
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.store.atomic_store(&seed)
    }

    /// The active seed.
    pub fn current_seed(&self) -> Result<Seed, SeedError> {
        self.store.load()?.ok_or(SeedError::Unavailable)
    }
}
