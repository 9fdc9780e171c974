//! Append the current 2FA code to the cron log.
//!
//! Meant to be run once a minute by an external scheduler. Always exits 0:
//! failures are written to the log itself.

use authproof::config::Config;
use authproof::cron;
use authproof::store::{FileSeedStore, SeedVault};

fn main() {
    authproof::init_tracing();

    let config = Config::from_env();
    let vault = SeedVault::new(FileSeedStore::new(&config.seed_path));
    cron::run_once(&vault, &config.cron_log_path, chrono::Utc::now());
}
