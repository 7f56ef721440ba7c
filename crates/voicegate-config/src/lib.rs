#![allow(clippy::must_use_candidate)]

pub mod auth;
pub mod cors;
mod env;
pub mod health;
mod loader;
pub mod server;
pub mod telemetry;
pub mod tts;

use serde::Deserialize;

pub use auth::*;
pub use cors::*;
pub use health::*;
pub use server::*;
pub use telemetry::{LogFormat, TelemetryConfig};
pub use tts::*;

/// Top-level voicegate configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Voice-token authentication
    #[serde(default)]
    pub auth: AuthConfig,
    /// TTS upstream configuration
    #[serde(default)]
    pub tts: TtsConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
