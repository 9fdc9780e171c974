//! Offline commit proof workflow.
//!
//! Runs the proof steps in a fixed order and reports the first failing
//! stage. Each stage has its own process exit code so scripts can tell
//! them apart.

use std::path::PathBuf;

use crate::config::Config;
use crate::crypto::keys;
use crate::crypto::signing::{self, CommitHash, Proof, ProofError};
use crate::vcs::CommitSource;

/// A step of the proof workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofStage {
    /// A key file does not exist.
    KeyNotFound,
    /// No usable 40-character commit hash.
    CommitHash,
    LoadPrivateKey,
    LoadRecipientKey,
    Signing,
    /// Includes the recipient key being too small for the signature.
    Encryption,
}

impl ProofStage {
    /// Process exit code for a failure at this stage.
    pub fn exit_code(self) -> i32 {
        match self {
            ProofStage::KeyNotFound => 2,
            ProofStage::CommitHash => 3,
            ProofStage::LoadPrivateKey => 4,
            ProofStage::LoadRecipientKey => 5,
            ProofStage::Signing => 6,
            ProofStage::Encryption => 7,
        }
    }
}

/// A failed proof run.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ProofFailure {
    pub stage: ProofStage,
    pub message: String,
}

impl ProofFailure {
    fn new(stage: ProofStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.stage.exit_code()
    }
}

/// Inputs to one proof run.
#[derive(Debug, Clone)]
pub struct ProofRequest {
    pub private_key: PathBuf,
    pub recipient_key: PathBuf,
}

impl ProofRequest {
    /// Explicit paths win; otherwise the configured student and instructor keys.
    pub fn resolve(
        private_key: Option<PathBuf>,
        recipient_key: Option<PathBuf>,
        config: &Config,
    ) -> Self {
        Self {
            private_key: private_key.unwrap_or_else(|| config.student_private_key.clone()),
            recipient_key: recipient_key.unwrap_or_else(|| config.instructor_public_key.clone()),
        }
    }
}

/// Produce a proof for the commit supplied by `source`.
pub fn run(request: &ProofRequest, source: &dyn CommitSource) -> Result<Proof, ProofFailure> {
    for (path, label) in [
        (&request.private_key, "private key"),
        (&request.recipient_key, "instructor public key"),
    ] {
        if !path.exists() {
            return Err(ProofFailure::new(
                ProofStage::KeyNotFound,
                format!("{label} not found at {}", path.display()),
            ));
        }
    }

    let commit_hash = source
        .latest_commit()
        .map_err(|e| ProofFailure::new(ProofStage::CommitHash, e.to_string()))
        .and_then(|hash| {
            CommitHash::parse(&hash)
                .map_err(|e| ProofFailure::new(ProofStage::CommitHash, e.to_string()))
        })?;

    let private_key = keys::load_private(&request.private_key).map_err(|e| {
        ProofFailure::new(
            ProofStage::LoadPrivateKey,
            format!("failed to load private key: {e}"),
        )
    })?;
    let recipient_key = keys::load_public(&request.recipient_key).map_err(|e| {
        ProofFailure::new(
            ProofStage::LoadRecipientKey,
            format!("failed to load instructor public key: {e}"),
        )
    })?;

    let proof = signing::produce_proof(commit_hash.as_str(), &private_key, &recipient_key)
        .map_err(|e| ProofFailure::new(stage_of(&e), e.to_string()))?;

    tracing::info!(commit = %proof.commit_hash, "Commit proof generated");
    Ok(proof)
}

fn stage_of(error: &ProofError) -> ProofStage {
    match error {
        ProofError::InvalidCommitHash(_) => ProofStage::CommitHash,
        ProofError::Signing(_) => ProofStage::Signing,
        ProofError::EncryptionCapacityExceeded { .. }
        | ProofError::Encryption(_)
        | ProofError::Decryption(_) => ProofStage::Encryption,
    }
}

/// Output format: the commit hash, then the base64 encrypted signature.
pub fn render(proof: &Proof) -> String {
    format!("{}\n{}\n", proof.commit_hash, proof.encrypted_signature_b64)
}
