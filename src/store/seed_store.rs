//! Persistence backends for the active seed.
//!
//! [`FileSeedStore`] is the production backend; [`MemorySeedStore`] is a
//! drop-in double for tests and embedding.

use super::types::{Seed, SeedError};
use crate::crypto::keys::set_mode;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Permission bits for the seed file.
const SEED_FILE_MODE: u32 = 0o600;

/// Storage for the single active seed.
///
/// `atomic_store` must replace the previous value in one step: a concurrent
/// `load` returns either the old seed or the new one, never a mix.
pub trait SeedStore: Send + Sync {
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Seed>, SeedError>;

    fn atomic_store(&self, seed: &Seed) -> Result<(), SeedError>;
}

/// Seed persisted as a single-line file.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the target.
#[derive(Debug, Clone)]
pub struct FileSeedStore {
    path: PathBuf,
}

impl FileSeedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> SeedError {
        SeedError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SeedStore for FileSeedStore {
    fn load(&self) -> Result<Option<Seed>, SeedError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Seed::from_stored(&contents).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn atomic_store(&self, seed: &Seed) -> Result<(), SeedError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".seed")
            .tempfile_in(dir)
            .map_err(|e| self.io_err(e))?;

        // Tighten before the secret is written
        set_mode(tmp.path(), SEED_FILE_MODE).map_err(|e| self.io_err(e))?;
        tmp.write_all(seed.as_hex().as_bytes())
            .map_err(|e| self.io_err(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_err(e))?;

        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;

        tracing::info!(path = %self.path.display(), "Seed stored");
        Ok(())
    }
}

/// Seed held in memory only.
#[derive(Debug, Default)]
pub struct MemorySeedStore {
    slot: RwLock<Option<Seed>>,
}

impl MemorySeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out holding `seed`.
    pub fn with_seed(seed: Seed) -> Self {
        Self {
            slot: RwLock::new(Some(seed)),
        }
    }
}

impl SeedStore for MemorySeedStore {
    fn load(&self) -> Result<Option<Seed>, SeedError> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        Ok(slot.clone())
    }

    fn atomic_store(&self, seed: &Seed) -> Result<(), SeedError> {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(seed.clone());
        Ok(())
    }
}
