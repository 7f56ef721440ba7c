use std::path::PathBuf;

use clap::Parser;

/// Voicegate TTS proxy
#[derive(Debug, Parser)]
#[command(name = "voicegate", about = "Token-gated text-to-speech proxy for Deepgram")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "voicegate.toml", env = "VOICEGATE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "VOICEGATE_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,

    /// Log filter directive (e.g. `info`, `voicegate=debug,tts=trace`)
    #[arg(long, default_value = "info", env = "VOICEGATE_LOG")]
    pub log: String,
}
