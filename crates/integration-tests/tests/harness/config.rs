//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use voicegate_config::{
    AuthConfig, Config, CorsConfig, DeepgramConfig, HealthConfig, ServerConfig, TtsConfig,
};

/// Voice token accepted by servers built from `ConfigBuilder`
pub const TEST_TOKEN: &str = "test-voice-token";

/// Deepgram API key the gateway presents upstream
pub const TEST_API_KEY: &str = "test-deepgram-key";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder whose Deepgram provider points at `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                auth: AuthConfig {
                    voice_tokens: vec![SecretString::from(TEST_TOKEN.to_owned())],
                    ..AuthConfig::default()
                },
                tts: TtsConfig {
                    deepgram: DeepgramConfig {
                        api_key: Some(SecretString::from(TEST_API_KEY.to_owned())),
                        base_url: Some(base_url.parse().expect("valid URL")),
                    },
                    chunk_delay: Duration::ZERO,
                    ..TtsConfig::default()
                },
                telemetry: None,
            },
        }
    }

    /// Limit the characters sent in one upstream call
    pub fn with_max_chunk_chars(mut self, max: usize) -> Self {
        self.config.tts.max_chunk_chars = max;
        self
    }

    /// Set the per-call upstream timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.tts.timeout = timeout;
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
