//! HTTP server module for the seed and 2FA endpoints.
//!
//! Provides a small REST API over the seed vault and OTP engine.

pub mod routes;
pub mod state;

use crate::config::{Config, ConfigError};
use crate::server::routes::{health, seed, totp};
use crate::server::state::AppState;
use crate::store::{FileSeedStore, SeedVault};

use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Builds the router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    // CORS layer for browser clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/decrypt-seed", post(seed::decrypt_seed))
        .route("/generate-2fa", get(totp::generate_code))
        .route("/verify-2fa", post(totp::verify_code))
        .layer(cors)
        .with_state(state)
}

/// Runs the axum server until `shutdown` resolves.
pub async fn run_server(
    config: &Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let addr = config.socket_addr()?;

    if !config.student_private_key.exists() {
        tracing::warn!(
            path = %config.student_private_key.display(),
            "Private key missing; seed provisioning will fail until a keypair is generated"
        );
    }

    let vault = SeedVault::new(FileSeedStore::new(&config.seed_path));
    let state = Arc::new(AppState::new(vault, &config.student_private_key));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{oaep, otp, KeyPair};
    use crate::store::{MemorySeedStore, Seed};
    use crate::test_support::SIGNER_KEY;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use base64::Engine;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SEED: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
    const NOW: u64 = 1_699_999_995;

    fn fixed_clock() -> u64 {
        NOW
    }

    struct Harness {
        state: Arc<AppState>,
        _dir: tempfile::TempDir,
    }

    fn harness(store: MemorySeedStore) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let private_path = dir.path().join("student_private.pem");
        KeyPair::from_private(SIGNER_KEY.clone())
            .write(&private_path, &dir.path().join("student_public.pem"))
            .unwrap();

        let state = AppState::new(SeedVault::new(store), private_path).with_clock(fixed_clock);
        Harness {
            state: Arc::new(state),
            _dir: dir,
        }
    }

    async fn call(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(Arc::clone(state)).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn encrypted_seed(plaintext: &[u8]) -> String {
        let ct = oaep::encrypt(&SIGNER_KEY.to_public_key(), plaintext).unwrap();
        base64::engine::general_purpose::STANDARD.encode(ct)
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(MemorySeedStore::new());
        let (status, body) = call(&h.state, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_provision_generate_verify() {
        let h = harness(MemorySeedStore::new());

        let (status, body) = call(
            &h.state,
            post_json("/decrypt-seed", json!({ "encrypted_seed": encrypted_seed(SEED.as_bytes()) })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(h.state.vault.current_seed().unwrap().as_hex(), SEED);

        let (status, body) =
            call(&h.state, Request::get("/generate-2fa").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        let code = body["code"].as_str().unwrap().to_string();
        assert_eq!(code.len(), 6);
        assert_eq!(body["valid_for"], 15);

        let expected = otp::generate(&otp::to_secret(&Seed::parse(SEED).unwrap()), NOW);
        assert_eq!(code, expected.code.as_str());

        let (status, body) = call(&h.state, post_json("/verify-2fa", json!({ "code": code }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
    }

    #[tokio::test]
    async fn test_malformed_base64_persists_nothing() {
        let h = harness(MemorySeedStore::new());
        let (status, body) = call(
            &h.state,
            post_json("/decrypt-seed", json!({ "encrypted_seed": "not*base64!" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid base64");
        assert!(h.state.vault.current_seed().is_err());
    }

    #[tokio::test]
    async fn test_missing_encrypted_seed() {
        let h = harness(MemorySeedStore::new());
        for body in [json!({}), json!({ "encrypted_seed": "" })] {
            let (status, body) = call(&h.state, post_json("/decrypt-seed", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "missing encrypted_seed");
        }
    }

    #[tokio::test]
    async fn test_bad_seed_and_bad_ciphertext_look_the_same() {
        let h = harness(MemorySeedStore::with_seed(Seed::parse(SEED).unwrap()));

        let short_seed = encrypted_seed(&SEED.as_bytes()[..63]);
        let garbage = base64::engine::general_purpose::STANDARD.encode([0x42u8; 256]);

        let first = call(&h.state, post_json("/decrypt-seed", json!({ "encrypted_seed": short_seed }))).await;
        let second = call(&h.state, post_json("/decrypt-seed", json!({ "encrypted_seed": garbage }))).await;

        assert_eq!(first, second);
        assert_eq!(first.0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(first.1["error"], "Decryption failed");
        assert_eq!(h.state.vault.current_seed().unwrap().as_hex(), SEED);
    }

    #[tokio::test]
    async fn test_missing_private_key() {
        let state = AppState::new(
            SeedVault::new(MemorySeedStore::new()),
            "/nonexistent/student_private.pem",
        );
        let state = Arc::new(state);
        let (status, body) = call(
            &state,
            post_json("/decrypt-seed", json!({ "encrypted_seed": encrypted_seed(SEED.as_bytes()) })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Private key unavailable");
    }

    #[tokio::test]
    async fn test_codes_without_seed() {
        let h = harness(MemorySeedStore::new());

        let (status, body) =
            call(&h.state, Request::get("/generate-2fa").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Seed unavailable");

        let (status, _) = call(&h.state, post_json("/verify-2fa", json!({ "code": "123456" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_verify_missing_and_wrong_code() {
        let h = harness(MemorySeedStore::with_seed(Seed::parse(SEED).unwrap()));

        let (status, body) = call(&h.state, post_json("/verify-2fa", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing code");

        let secret = otp::to_secret(&Seed::parse(SEED).unwrap());
        let stale = otp::generate(&secret, NOW - 60).code;
        let (status, body) = call(&h.state, post_json("/verify-2fa", json!({ "code": stale.as_str() }))).await;
        assert_eq!(status, StatusCode::OK);
        // Two steps back is outside the window unless the codes collide
        let collides = [NOW - 30, NOW, NOW + 30]
            .iter()
            .any(|&t| otp::generate(&secret, t).code == stale);
        assert_eq!(body["valid"], collides);
    }
}
