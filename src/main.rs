//! authproof - seed provisioning and 2FA server.
//!
//! `authproof keygen` provisions the student keypair once; `authproof serve`
//! (the default) runs the HTTP API.

use anyhow::Context;
use authproof::config::Config;
use authproof::crypto::keys;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Parser)]
#[command(name = "authproof", version, about = "Seed provisioning and 2FA server")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Generate the 4096-bit student keypair
    Keygen {
        /// Private key output path
        #[arg(long)]
        private: Option<PathBuf>,
        /// Public key output path
        #[arg(long)]
        public: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    authproof::init_tracing();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config),
        Command::Keygen { private, public } => {
            let private = private.unwrap_or_else(|| config.student_private_key.clone());
            let public = public.unwrap_or_else(|| config.student_public_key.clone());

            println!("🔧 Generating 4096-bit RSA keypair (this can take a while)...");
            keys::generate_keypair(&private, &public).context("Key generation failed")?;
            println!("   ✓ Private key: {}", private.display());
            println!("   ✓ Public key:  {}", public.display());
            Ok(())
        }
    }
}

fn serve(config: Config) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;

    // Ctrl+C resolves the shutdown future once
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let shutdown_tx = Arc::new(Mutex::new(Some(shutdown_tx)));
    ctrlc::set_handler(move || {
        tracing::info!("Shutdown signal received");
        if let Some(tx) = shutdown_tx.lock().ok().and_then(|mut tx| tx.take()) {
            let _ = tx.send(());
        }
    })
    .context("Failed to install Ctrl+C handler")?;

    println!("🌐 API available at http://{}", config.bind_addr);
    println!("   • POST /decrypt-seed - Provision the shared seed");
    println!("   • GET  /generate-2fa - Current 2FA code");
    println!("   • POST /verify-2fa   - Check a 2FA code");

    runtime.block_on(async {
        authproof::server::run_server(&config, async move {
            let _ = shutdown_rx.await;
        })
        .await
    })?;

    println!("👋 authproof has exited. Goodbye!");
    Ok(())
}
