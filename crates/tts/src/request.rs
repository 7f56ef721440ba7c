use axum::body::Body;
use axum::response::IntoResponse;
use serde::de::DeserializeOwned;
use voicegate_core::Caller;

use crate::error::TtsError;

/// Runtime context for a TTS request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub parts: http::request::Parts,

    /// Caller admitted by the voice-token gate
    pub caller: Option<Caller>,
}

impl RequestContext {
    /// Token fingerprint for log lines, `-` when the gate did not run
    pub fn caller_fingerprint(&self) -> &str {
        self.caller.as_ref().map_or("-", |caller| caller.fingerprint.as_str())
    }
}

/// Extractor for JSON request bodies
pub struct ExtractPayload<T>(pub RequestContext, pub T);

/// Body limit for TTS requests (1 MiB)
const BODY_LIMIT_BYTES: usize = 1 << 20;

impl<S, T: DeserializeOwned> axum::extract::FromRequest<S> for ExtractPayload<T>
where
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = request.into_parts();

        if !is_json(&parts.headers) {
            return Err(TtsError::UnsupportedMediaType(
                "Unsupported Content-Type, expected: 'Content-Type: application/json'".to_string(),
            )
            .into_response());
        }

        let bytes = axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
            if std::error::Error::source(&err)
                .is_some_and(|source| source.is::<http_body_util::LengthLimitError>())
            {
                TtsError::PayloadTooLarge(format!("Request body is too large, limit is {BODY_LIMIT_BYTES} bytes"))
            } else {
                TtsError::InvalidRequest(format!("Failed to read request body: {err}"))
            }
            .into_response()
        })?;

        let body = serde_json::from_slice::<T>(&bytes)
            .map_err(|e| TtsError::InvalidRequest(format!("Failed to parse request body: {e}")).into_response())?;

        let ctx = RequestContext {
            caller: parts.extensions.remove(),
            parts,
        };

        Ok(Self(ctx, body))
    }
}

/// Accept `application/json` with optional parameters such as `charset`
fn is_json(headers: &http::HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}
