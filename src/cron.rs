//! Periodic 2FA code logging.
//!
//! Each invocation appends exactly one line to the log: the current code,
//! or the reason it could not be produced. Failures never propagate past
//! [`run_once`].

use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::crypto::otp::{self, TotpCode};
use crate::store::SeedVault;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a successful log line.
pub fn code_line(now: DateTime<Utc>, code: &TotpCode) -> String {
    format!("{} - 2FA Code: {}\n", now.format(TIMESTAMP_FORMAT), code)
}

/// Format a failure log line.
pub fn error_line(message: &str) -> String {
    format!("ERROR: {message}\n")
}

/// Generate the code for `now` and append the outcome to `log_path`.
///
/// Returns whether a code was logged.
pub fn run_once(vault: &SeedVault, log_path: &Path, now: DateTime<Utc>) -> bool {
    let (line, logged) = match current_code(vault, now) {
        Ok(code) => (code_line(now, &code), true),
        Err(message) => {
            tracing::warn!(error = %message, "2FA code generation failed");
            (error_line(&message), false)
        }
    };

    if let Err(e) = append_line(log_path, &line) {
        tracing::error!(path = %log_path.display(), error = %e, "Failed to append to code log");
        return false;
    }
    logged
}

fn current_code(vault: &SeedVault, now: DateTime<Utc>) -> Result<TotpCode, String> {
    let seed = vault.current_seed().map_err(|e| e.to_string())?;
    let time_t = u64::try_from(now.timestamp())
        .map_err(|_| "clock is before the unix epoch".to_string())?;
    Ok(otp::generate(&otp::to_secret(&seed), time_t).code)
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}
