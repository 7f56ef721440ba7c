use std::time::Duration;

use axum::http;
use reqwest::Client;
use voicegate_config::TtsConfig;

use crate::error::TtsError;

/// Build the HTTP client shared by every upstream call
///
/// Only the connect phase is bounded here; providers bound each call with
/// `tts.timeout` themselves so that streamed bodies are not cut short.
pub fn http_client(config: &TtsConfig) -> crate::Result<Client> {
    let mut headers = http::HeaderMap::new();
    headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));

    Client::builder()
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(Some(Duration::from_secs(30)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .user_agent(concat!("voicegate/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .build()
        .map_err(|e| TtsError::ConfigError(format!("Failed to build HTTP client: {e}")))
}
