use std::time::Duration;

use duration_str::deserialize_duration;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Top-level TTS configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TtsConfig {
    /// Upstream Deepgram connection
    #[serde(default)]
    pub deepgram: DeepgramConfig,

    /// Maximum characters of text sent in one upstream call
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Pause between consecutive chunk calls for the same request
    #[serde(default = "default_chunk_delay", deserialize_with = "deserialize_duration")]
    pub chunk_delay: Duration,

    /// Timeout for a single upstream call
    ///
    /// Downloads must receive the whole payload within it. Streams must
    /// receive response headers within it, then each body read must make
    /// progress within it.
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,

    /// Timeout for establishing the upstream connection
    #[serde(default = "default_connect_timeout", deserialize_with = "deserialize_duration")]
    pub connect_timeout: Duration,

    /// Values used when a request leaves synthesis options unset
    #[serde(default)]
    pub defaults: SynthesisDefaults,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            deepgram: DeepgramConfig::default(),
            max_chunk_chars: default_max_chunk_chars(),
            chunk_delay: default_chunk_delay(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            defaults: SynthesisDefaults::default(),
        }
    }
}

/// Deepgram API access
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeepgramConfig {
    /// API key sent as `Authorization: Token <key>`
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override (defaults to `https://api.deepgram.com/v1`)
    #[serde(default)]
    pub base_url: Option<Url>,
}

/// Synthesis options applied when the request omits them
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisDefaults {
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_bit_rate")]
    pub bit_rate: u32,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for SynthesisDefaults {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            encoding: default_encoding(),
            sample_rate: default_sample_rate(),
            bit_rate: default_bit_rate(),
            language: default_language(),
        }
    }
}

const fn default_max_chunk_chars() -> usize {
    1800
}

const fn default_chunk_delay() -> Duration {
    Duration::from_millis(300)
}

const fn default_timeout() -> Duration {
    Duration::from_secs(45)
}

const fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_voice() -> String {
    "aura-luna-en".to_string()
}

fn default_encoding() -> String {
    "mp3".to_string()
}

const fn default_sample_rate() -> u32 {
    48_000
}

const fn default_bit_rate() -> u32 {
    192_000
}

fn default_language() -> String {
    "en".to_string()
}
