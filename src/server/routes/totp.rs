//! 2FA code generation and verification endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::crypto::otp;
use crate::error::ApiError;
use crate::server::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct CodeResponse {
    pub code: String,
    /// Seconds before the code changes, 1-30.
    pub valid_for: u64,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

/// GET /generate-2fa - Current code for the active seed.
pub async fn generate_code(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CodeResponse>, ApiError> {
    let seed = state.vault.current_seed()?;
    let generated = otp::generate(&otp::to_secret(&seed), state.now());

    Ok(Json(CodeResponse {
        code: generated.code.to_string(),
        valid_for: generated.valid_for,
    }))
}

/// POST /verify-2fa - Check a code against the current window.
pub async fn verify_code(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let code = payload
        .ok()
        .and_then(|Json(request)| request.code)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing code"))?;

    let seed = state.vault.current_seed()?;
    let valid = otp::verify(&otp::to_secret(&seed), &code, state.now());
    tracing::info!(valid, "2FA code checked");

    Ok(Json(VerifyResponse { valid }))
}
