//! Runtime configuration.
//!
//! Defaults match the conventional repository layout (`keys/`, `data/`,
//! `cron/`). An optional JSON file and `AUTHPROOF_*` environment variables
//! override them, in that order.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default server bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Student private key, used to decrypt seeds and sign commits.
    pub student_private_key: PathBuf,

    /// Student public key, written alongside the private key.
    pub student_public_key: PathBuf,

    /// Instructor public key, the recipient of commit proofs.
    pub instructor_public_key: PathBuf,

    /// Single-line seed file.
    pub seed_path: PathBuf,

    /// Append-only log written by the periodic trigger.
    pub cron_log_path: PathBuf,

    /// Address the HTTP server listens on.
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            student_private_key: PathBuf::from("keys/student_private.pem"),
            student_public_key: PathBuf::from("keys/student_public.pem"),
            instructor_public_key: PathBuf::from("keys/instructor_public.pem"),
            seed_path: PathBuf::from("data/seed.txt"),
            cron_log_path: PathBuf::from("cron/last_code.txt"),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then `file` if given, then environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay variables found by `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let path_vars: [(&str, &mut PathBuf); 5] = [
            ("AUTHPROOF_PRIVATE_KEY", &mut self.student_private_key),
            ("AUTHPROOF_PUBLIC_KEY", &mut self.student_public_key),
            ("AUTHPROOF_INSTRUCTOR_KEY", &mut self.instructor_public_key),
            ("AUTHPROOF_SEED_PATH", &mut self.seed_path),
            ("AUTHPROOF_CRON_LOG", &mut self.cron_log_path),
        ];
        for (key, slot) in path_vars {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = PathBuf::from(value);
            }
        }

        if let Some(bind) = lookup("AUTHPROOF_BIND").filter(|v| !v.is_empty()) {
            self.bind_addr = bind;
        }
    }

    /// Parsed bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(self.bind_addr.clone()))
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid bind address: {0}")]
    InvalidBindAddr(String),
}
