#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod http_client;
mod provider;
mod request;
mod server;
pub mod text;
mod types;
mod wav;

use std::sync::Arc;

use axum::{Router, extract::State, routing::post};

pub use error::{Result, TtsError};
pub use provider::{AudioStream, StreamedAudio, SynthesizedAudio, TtsProvider};
pub use request::RequestContext;
pub use server::{Server, TtsServerBuilder};
pub use types::{AudioFormat, Encoding, Mode, SpeechDefaults, SpeechParams, SynthesisOptions, TtsRequest};
use request::ExtractPayload;

/// Build the TTS server from configuration
pub fn build_server(config: &voicegate_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        TtsServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize TTS server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for TTS
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/tts", post(synthesize))
}

/// Handle speech synthesis requests
async fn synthesize(
    State(server): State<Arc<Server>>,
    ExtractPayload(context, request): ExtractPayload<TtsRequest>,
) -> Result<axum::response::Response> {
    let mode = request.mode.unwrap_or_default();

    tracing::debug!("TTS handler called, mode: {}", mode.as_str());

    let response = server.synthesize(request, &context).await.inspect_err(|e| {
        tracing::warn!(mode = mode.as_str(), "TTS request failed: {e}");
    })?;

    tracing::debug!("TTS response started");

    Ok(response)
}
