//! Shared application state for the HTTP server.

use std::path::PathBuf;

use crate::store::SeedVault;

/// Source of the current unix time, in seconds.
pub type Clock = fn() -> u64;

/// Application state shared across all handlers.
pub struct AppState {
    /// The active seed.
    pub vault: SeedVault,

    /// Private key used to decrypt provisioned seeds. Loaded per request so
    /// a replaced key file takes effect without a restart.
    pub private_key_path: PathBuf,

    clock: Clock,
}

impl AppState {
    /// Creates new app state reading the system clock.
    pub fn new(vault: SeedVault, private_key_path: impl Into<PathBuf>) -> Self {
        Self {
            vault,
            private_key_path: private_key_path.into(),
            clock: unix_now,
        }
    }

    /// Replace the clock, for deterministic tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current unix time according to this state's clock.
    pub fn now(&self) -> u64 {
        (self.clock)()
    }
}

/// Seconds since the unix epoch; zero if the system clock is before it.
pub fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}
