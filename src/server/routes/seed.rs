//! Seed provisioning endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::crypto::keys;
use crate::error::ApiError;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DecryptSeedRequest {
    /// Base64 RSA-OAEP ciphertext of the 64-hex-character seed.
    pub encrypted_seed: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// POST /decrypt-seed - Decrypt and store a new seed.
///
/// Request errors (missing field, bad base64) are reported precisely. Every
/// failure after that point is reported as one of the generic messages in
/// [`ApiError`].
pub async fn decrypt_seed(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DecryptSeedRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected seed request body");
        ApiError::bad_request("invalid JSON body")
    })?;

    let encoded: String = request
        .encrypted_seed
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if encoded.is_empty() {
        return Err(ApiError::bad_request("missing encrypted_seed"));
    }

    let ciphertext = base64::engine::general_purpose::STANDARD
        .decode(&encoded)
        .map_err(|_| ApiError::bad_request("invalid base64"))?;

    // Key parsing and RSA decryption are CPU-bound.
    let task_state = Arc::clone(&state);
    tokio::task::spawn_blocking(move || -> Result<(), ApiError> {
        let key = keys::load_private(&task_state.private_key_path)?;
        task_state.vault.decrypt_and_store(&ciphertext, &key)?;
        Ok(())
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Seed provisioning task failed");
        ApiError::Internal
    })??;

    tracing::info!("Seed provisioned");
    Ok(Json(StatusResponse { status: "ok" }))
}
