use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use voicegate_core::HttpError;

pub type Result<T> = std::result::Result<T, TtsError>;

/// TTS service errors with appropriate HTTP status codes
#[derive(Debug, Error)]
pub enum TtsError {
    /// Invalid request body or parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request body is not JSON
    #[error("{0}")]
    UnsupportedMediaType(String),

    /// Request body exceeds the size limit
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Upstream rejected the configured credentials
    #[error("Upstream authentication failed: {0}")]
    UpstreamAuthentication(String),

    /// Provider API returned a non-success status
    #[error("Deepgram API error ({status}): {message}")]
    ProviderApiError { status: u16, message: String },

    /// Network or connection error reaching the provider
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Provider did not answer within the configured timeout
    #[error("Upstream request timed out")]
    Timeout,

    /// Reading the provider's audio body failed after the response started
    #[error("Streaming error: {0}")]
    Streaming(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal server error
    /// If Some(message), it came from a provider and can be shown
    /// If None, it's an internal error and should not leak details
    #[error("Internal server error")]
    InternalError(Option<String>),
}

impl TtsError {
    /// Build the error for a failed `reqwest` send
    pub(crate) fn from_send(provider: &str, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::ConnectionError(format!("Failed to send request to {provider}: {error}"))
        }
    }

    /// Build the error for a non-success upstream status
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::UpstreamAuthentication(message),
            _ => Self::ProviderApiError { status, message },
        }
    }

    /// Upstream HTTP status, when the provider answered at all
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::ProviderApiError { status, .. } => Some(*status),
            Self::UpstreamAuthentication(_) => Some(401),
            _ => None,
        }
    }

    /// Whether this error originated from the upstream provider
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamAuthentication(_)
                | Self::ProviderApiError { .. }
                | Self::ConnectionError(_)
                | Self::Timeout
                | Self::Streaming(_)
        )
    }
}

impl HttpError for TtsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ProviderApiError { status, .. } => match *status {
                400 | 422 => StatusCode::BAD_REQUEST,
                429 => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::UpstreamAuthentication(_) | Self::ConnectionError(_) | Self::Streaming(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::ConfigError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) | Self::UnsupportedMediaType(_) | Self::PayloadTooLarge(_) => {
                "invalid_request_error"
            }
            Self::ProviderApiError { status: 429, .. } => "rate_limit_error",
            Self::UpstreamAuthentication(_)
            | Self::ProviderApiError { .. }
            | Self::ConnectionError(_)
            | Self::Timeout
            | Self::Streaming(_) => "upstream_error",
            Self::ConfigError(_) | Self::InternalError(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::UpstreamAuthentication(_) => "Upstream TTS provider rejected the gateway credentials".to_string(),
            Self::ConnectionError(_) => "Failed to reach the upstream TTS provider".to_string(),
            Self::ConfigError(_) | Self::InternalError(None) => "Internal server error".to_string(),
            Self::InternalError(Some(provider_msg)) => provider_msg.clone(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(voicegate_core::error_body(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_statuses_map_to_gateway_statuses() {
        let cases = [
            (400, StatusCode::BAD_REQUEST),
            (429, StatusCode::TOO_MANY_REQUESTS),
            (500, StatusCode::BAD_GATEWAY),
            (503, StatusCode::BAD_GATEWAY),
            (401, StatusCode::BAD_GATEWAY),
            (403, StatusCode::BAD_GATEWAY),
        ];

        for (upstream, expected) in cases {
            let error = TtsError::from_status(upstream, "nope".to_string());
            assert_eq!(error.status_code(), expected, "upstream status {upstream}");
            assert!(error.is_upstream());
        }
    }

    #[test]
    fn provider_message_is_exposed() {
        let error = TtsError::from_status(400, "unknown model".to_string());
        assert_eq!(error.client_message(), "Deepgram API error (400): unknown model");
    }

    #[test]
    fn credential_and_internal_details_are_hidden() {
        let error = TtsError::from_status(401, "invalid key dg-123".to_string());
        assert!(!error.client_message().contains("dg-123"));

        let error = TtsError::ConfigError("missing api key".to_string());
        assert_eq!(error.client_message(), "Internal server error");
    }

    #[test]
    fn timeout_is_gateway_timeout() {
        assert_eq!(TtsError::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(TtsError::Timeout.upstream_status(), None);
    }
}
