pub(crate) mod deepgram;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;

use crate::types::SpeechParams;

/// Audio body relayed from the provider as it arrives
pub type AudioStream = Pin<Box<dyn Stream<Item = crate::Result<Bytes>> + Send>>;

/// Complete audio for one text chunk
pub struct SynthesizedAudio {
    pub audio: Bytes,
    /// Content type reported by the provider
    pub content_type: Option<String>,
}

/// Audio for one text chunk whose body has not been read yet
pub struct StreamedAudio {
    pub body: AudioStream,
    /// Content type reported by the provider
    pub content_type: Option<String>,
}

/// Trait for TTS provider implementations
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Synthesize one chunk of text and wait for the whole payload
    async fn synthesize(&self, text: &str, params: &SpeechParams) -> crate::Result<SynthesizedAudio>;

    /// Synthesize one chunk of text and return once the provider starts answering
    ///
    /// A non-success status is reported here, before any audio is relayed.
    async fn synthesize_stream(&self, text: &str, params: &SpeechParams) -> crate::Result<StreamedAudio>;

    /// Get the provider name
    fn name(&self) -> &str;
}
