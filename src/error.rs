//! Caller-facing error categories for the HTTP boundary.
//!
//! Internal errors carry full detail and are logged here; what leaves the
//! process is one of a few fixed messages. Decryption failures and seed
//! shape failures share one message so a caller cannot tell a wrong key from
//! a wrong plaintext.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::crypto::KeyError;
use crate::store::SeedError;

/// Error returned by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request: bad encoding, missing field, wrong length.
    #[error("{0}")]
    BadRequest(String),

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Private key unavailable")]
    KeyUnavailable,

    #[error("Seed unavailable")]
    SeedUnavailable,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<KeyError> for ApiError {
    fn from(e: KeyError) -> Self {
        tracing::error!(error = %e, "Failed to load private key");
        ApiError::KeyUnavailable
    }
}

impl From<SeedError> for ApiError {
    fn from(e: SeedError) -> Self {
        match e {
            SeedError::Decrypt(_) | SeedError::Format(_) => {
                tracing::error!(error = %e, "Seed decryption failed");
                ApiError::DecryptionFailed
            }
            SeedError::Unavailable => {
                tracing::warn!("No seed has been provisioned");
                ApiError::SeedUnavailable
            }
            SeedError::Corrupt(_) | SeedError::Io { .. } => {
                tracing::error!(error = %e, "Seed storage error");
                ApiError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_decrypt_and_format_errors_are_indistinguishable() {
        let from_decrypt = body_of(SeedError::Decrypt("oaep".into()).into()).await;
        let from_format = body_of(SeedError::Format("length 63".into()).into()).await;

        assert_eq!(from_decrypt, from_format);
        assert_eq!(from_decrypt.0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(from_decrypt.1["error"], "Decryption failed");
    }

    #[tokio::test]
    async fn test_bad_request_keeps_message() {
        let (status, body) = body_of(ApiError::bad_request("invalid base64")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid base64");
    }

    #[tokio::test]
    async fn test_key_error_detail_is_hidden() {
        let err: ApiError = KeyError::NotFound(PathBuf::from("/secret/path.pem")).into();
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Private key unavailable");
    }

    #[test]
    fn test_storage_errors_collapse_to_internal() {
        let err: ApiError = SeedError::Corrupt("bad".into()).into();
        assert!(matches!(err, ApiError::Internal));
        let err: ApiError = SeedError::Unavailable.into();
        assert!(matches!(err, ApiError::SeedUnavailable));
    }
}
