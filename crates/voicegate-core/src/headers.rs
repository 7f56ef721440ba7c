use http::HeaderMap;
use http::header::HeaderName;

/// Header carrying the shared voice token
pub static VOICE_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-voice-token");

/// Read the voice token from request headers
///
/// Returns `None` when the header is missing, not valid UTF-8, or blank.
pub fn voice_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(&VOICE_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    #[test]
    fn reads_trimmed_token() {
        let mut headers = HeaderMap::new();
        headers.insert(&VOICE_TOKEN_HEADER, HeaderValue::from_static("  secret "));

        assert_eq!(voice_token(&headers), Some("secret"));
    }

    #[test]
    fn blank_token_is_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(&VOICE_TOKEN_HEADER, HeaderValue::from_static("   "));

        assert_eq!(voice_token(&headers), None);
    }

    #[test]
    fn absent_header_is_missing() {
        assert_eq!(voice_token(&HeaderMap::new()), None);
    }
}
