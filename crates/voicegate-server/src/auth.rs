use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use voicegate_core::{Caller, HttpError, error_body, voice_token};

/// Rejection produced by the voice-token gate
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing voice token")]
    MissingToken,
    #[error("invalid voice token")]
    InvalidToken,
}

impl HttpError for AuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_type(&self) -> &str {
        "authentication_error"
    }

    fn client_message(&self) -> String {
        match self {
            Self::MissingToken => "Missing x-voice-token header".to_string(),
            Self::InvalidToken => "Invalid voice token".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status_code(), axum::Json(error_body(&self))).into_response()
    }
}

/// Accepted voice tokens, held as SHA-256 digests
#[derive(Clone)]
pub struct VoiceTokens {
    digests: Arc<[[u8; 32]]>,
}

impl VoiceTokens {
    pub fn new(tokens: &[SecretString]) -> Self {
        let digests = tokens.iter().map(|token| digest(token.expose_secret())).collect();
        Self { digests }
    }

    /// Check `token` against every configured token without early exit
    pub fn verify(&self, token: &str) -> bool {
        let presented = digest(token);

        self.digests
            .iter()
            .fold(false, |matched, expected| matched | digests_equal(expected, &presented))
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

fn digests_equal(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

/// Whether `path` is `public_path` itself or lies below it
///
/// Matching stops at segment boundaries, so `/health` covers `/health/live`
/// but not `/healthz`.
fn is_public(path: &str, public_path: &str) -> bool {
    let prefix = public_path.trim_end_matches('/');

    !prefix.is_empty()
        && path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Reject requests without a valid `x-voice-token`
///
/// Runs before the body is read, so a rejected request never reaches the
/// TTS handler or the upstream provider. Paths under one of `public_paths`
/// pass through untouched.
pub async fn auth_middleware(
    tokens: VoiceTokens,
    public_paths: Arc<[String]>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if public_paths.iter().any(|p| is_public(path, p)) {
        return next.run(request).await;
    }

    let caller = match voice_token(request.headers()) {
        None => Err(AuthError::MissingToken),
        Some(token) if tokens.verify(token) => Ok(Caller::from_token(token)),
        Some(_) => Err(AuthError::InvalidToken),
    };

    match caller {
        Ok(caller) => {
            tracing::debug!(caller = %caller.fingerprint, "voice token accepted");

            let mut request = request;
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(path = %request.uri().path(), "voice token authentication failed: {e}");
            e.into_response()
        }
    }
}
