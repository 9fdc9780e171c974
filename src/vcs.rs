//! Commit hash sources for the proof tool.

use std::path::PathBuf;
use std::process::Command;

use crate::crypto::signing::COMMIT_HASH_LEN;

/// Supplies the commit hash to prove.
pub trait CommitSource {
    fn latest_commit(&self) -> Result<String, VcsError>;
}

/// An operator-supplied hash, passed through unchanged.
#[derive(Debug, Clone)]
pub struct FixedCommit(pub String);

impl CommitSource for FixedCommit {
    fn latest_commit(&self) -> Result<String, VcsError> {
        Ok(self.0.clone())
    }
}

/// The `HEAD` commit of a git working tree.
#[derive(Debug, Clone)]
pub struct GitCommitSource {
    repo: PathBuf,
}

impl GitCommitSource {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }
}

impl CommitSource for GitCommitSource {
    fn latest_commit(&self) -> Result<String, VcsError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(["log", "-1", "--format=%H"])
            .output()
            .map_err(VcsError::Spawn)?;

        if !output.status.success() {
            return Err(VcsError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if hash.len() != COMMIT_HASH_LEN {
            return Err(VcsError::UnexpectedOutput(hash));
        }

        tracing::debug!(repo = %self.repo.display(), commit = %hash, "Resolved latest commit");
        Ok(hash)
    }
}

/// Errors from resolving a commit hash.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git failed; is this a git repository? {0}")]
    Failed(String),

    #[error("unexpected commit hash from git: {0:?}")]
    UnexpectedOutput(String),
}
