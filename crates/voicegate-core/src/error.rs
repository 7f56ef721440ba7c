use http::StatusCode;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type so that the server layer
/// and the feature handlers render errors the same way.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `invalid_request_error`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}

/// Render an error as the JSON body returned to API consumers
///
/// Shape: `{"error": {"message": ..., "type": ..., "code": <status>}}`
pub fn error_body(error: &dyn HttpError) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "message": error.client_message(),
            "type": error.error_type(),
            "code": error.status_code().as_u16(),
        }
    })
}
