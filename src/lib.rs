//! authproof - student identity and commit authorship verification.
//!
//! Two independent flows share one RSA keypair:
//! - a server that receives an RSA-OAEP encrypted seed and serves TOTP codes
//!   derived from it
//! - an offline tool that signs a commit hash and encrypts the signature for
//!   an instructor

pub mod config;
pub mod cron;
pub mod crypto;
pub mod error;
pub mod proof;
pub mod server;
pub mod store;
pub mod vcs;

#[cfg(test)]
pub(crate) mod test_support;

/// Installs the global tracing subscriber, filtered by `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("authproof=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
