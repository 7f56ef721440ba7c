use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::response::Response;
use bytes::BytesMut;
use futures_util::{StreamExt, stream};
use voicegate_telemetry::metrics::TtsMetrics;

use crate::{
    error::TtsError,
    http_client::http_client,
    provider::{AudioStream, TtsProvider, deepgram::DeepgramProvider},
    request::RequestContext,
    text::chunk_text,
    types::{AudioFormat, Encoding, Mode, SpeechDefaults, SpeechParams, TtsRequest},
    wav::linear16_wav,
};

/// TTS server that prepares text and relays audio from the provider
pub struct Server {
    provider: Arc<dyn TtsProvider>,
    defaults: SpeechDefaults,
    max_chunk_chars: usize,
    chunk_delay: Duration,
}

/// A request that passed validation, ready for the upstream calls
struct Prepared {
    mode: Mode,
    chunks: Vec<String>,
    params: SpeechParams,
    format: AudioFormat,
    assembly: Assembly,
}

/// How per-chunk payloads become one download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assembly {
    /// Payloads are joined byte-for-byte
    Concat,
    /// Bare PCM is fetched and wrapped in one WAV header
    Wav { sample_rate: u32 },
}

impl Server {
    /// Create a server around an already-built provider
    pub fn with_provider(
        provider: Arc<dyn TtsProvider>,
        defaults: SpeechDefaults,
        max_chunk_chars: usize,
        chunk_delay: Duration,
    ) -> Self {
        Self {
            provider,
            defaults,
            max_chunk_chars,
            chunk_delay,
        }
    }

    /// Synthesize the request and build the HTTP response for its mode
    pub async fn synthesize(&self, request: TtsRequest, context: &RequestContext) -> crate::Result<Response> {
        let prepared = self.prepare(request)?;
        let mode = prepared.mode.as_str();
        let metrics = TtsMetrics::global();
        let start = Instant::now();

        metrics.record_request(mode, prepared.chunks.len());

        tracing::debug!(
            mode,
            chunks = prepared.chunks.len(),
            caller = context.caller_fingerprint(),
            "TTS request accepted"
        );

        let result = match prepared.mode {
            Mode::Download => self.download(prepared).await,
            Mode::Stream => self.stream(prepared).await,
        };

        metrics.record_duration(mode, start, result.is_ok());

        if let Err(ref e) = result
            && e.is_upstream()
        {
            metrics.record_upstream_error(self.provider.name(), e.upstream_status());
        }

        result
    }

    fn prepare(&self, request: TtsRequest) -> crate::Result<Prepared> {
        if request.text.trim().is_empty() {
            return Err(TtsError::InvalidRequest("text must not be empty".to_string()));
        }

        let chunks = chunk_text(&request.text, self.max_chunk_chars);

        if chunks.is_empty() {
            return Err(TtsError::InvalidRequest(
                "text contains nothing to speak after removing formatting".to_string(),
            ));
        }

        let mode = request.mode.unwrap_or_default();
        let mut params = request.options.resolve(&self.defaults)?;
        let format = params.encoding.format(params.container.as_deref());

        let assembly = if chunks.len() == 1 || params.encoding.concatenates(params.container.as_deref()) {
            Assembly::Concat
        } else if mode == Mode::Download && params.encoding == Encoding::Linear16 {
            params.container = Some("none".to_string());
            Assembly::Wav {
                sample_rate: params.sample_rate,
            }
        } else {
            return Err(TtsError::InvalidRequest(format!(
                "{} audio in a container cannot be split across {} upstream calls; \
                 shorten the text, use mp3 or aac, or set container to \"none\"",
                params.encoding.as_str(),
                chunks.len()
            )));
        };

        Ok(Prepared {
            mode,
            chunks,
            params,
            format,
            assembly,
        })
    }

    /// Synthesize every chunk in order and return the joined payload
    async fn download(&self, prepared: Prepared) -> crate::Result<Response> {
        let total = prepared.chunks.len();
        let mut audio = BytesMut::new();
        let mut content_type = None;

        for (index, chunk) in prepared.chunks.iter().enumerate() {
            if index > 0 {
                pause(self.chunk_delay).await;
            }

            tracing::debug!(chunk = index + 1, total, "synthesizing chunk");

            let part = self.provider.synthesize(chunk, &prepared.params).await?;

            if content_type.is_none() {
                content_type = part.content_type;
            }

            audio.extend_from_slice(&part.audio);
        }

        let (audio, content_type) = match prepared.assembly {
            Assembly::Concat => (
                audio.freeze(),
                content_type.unwrap_or_else(|| prepared.format.content_type.to_string()),
            ),
            Assembly::Wav { sample_rate } => (
                linear16_wav(&audio, sample_rate)?,
                prepared.format.content_type.to_string(),
            ),
        };

        tracing::debug!("TTS download complete, {} bytes from {total} chunk(s)", audio.len());

        Response::builder()
            .header(http::header::CONTENT_TYPE, content_type)
            .header(http::header::CONTENT_LENGTH, audio.len())
            .header(
                http::header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"speech.{}\"", prepared.format.extension),
            )
            .body(Body::from(audio))
            .map_err(|e| TtsError::InternalError(Some(format!("Failed to build response: {e}"))))
    }

    /// Start relaying audio as soon as the first chunk's upstream call answers
    ///
    /// The first call happens before the response is returned so its failure
    /// becomes an HTTP error. Later chunks are requested only after the
    /// previous body is drained; a failure there ends the body early.
    async fn stream(&self, prepared: Prepared) -> crate::Result<Response> {
        let Prepared {
            chunks, params, format, ..
        } = prepared;

        let total = chunks.len();
        let mut chunks = chunks.into_iter();
        let first_chunk = chunks.next().ok_or_else(|| TtsError::InternalError(None))?;

        let first = self.provider.synthesize_stream(&first_chunk, &params).await?;
        let content_type = first
            .content_type
            .unwrap_or_else(|| format.content_type.to_string());

        let provider = Arc::clone(&self.provider);
        let delay = self.chunk_delay;
        let params = Arc::new(params);

        let rest = stream::iter(chunks.enumerate())
            .then(move |(index, chunk)| {
                let provider = Arc::clone(&provider);
                let params = Arc::clone(&params);

                async move {
                    pause(delay).await;
                    tracing::debug!(chunk = index + 2, total, "streaming chunk");

                    match provider.synthesize_stream(&chunk, &params).await {
                        Ok(next) => next.body,
                        Err(e) => {
                            tracing::error!("TTS stream aborted at chunk {}/{total}: {e}", index + 2);
                            stream::once(async move { Err(e) }).boxed()
                        }
                    }
                }
            })
            .flatten();

        let body: AudioStream = first.body.chain(rest).boxed();

        Response::builder()
            .header(http::header::CONTENT_TYPE, content_type)
            .header(http::header::CACHE_CONTROL, "no-cache")
            .body(Body::from_stream(body))
            .map_err(|e| TtsError::InternalError(Some(format!("Failed to build response: {e}"))))
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Builder for constructing the TTS server from configuration
pub struct TtsServerBuilder<'a> {
    config: &'a voicegate_config::Config,
}

impl<'a> TtsServerBuilder<'a> {
    pub const fn new(config: &'a voicegate_config::Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> crate::Result<Server> {
        let tts = &self.config.tts;

        let api_key = tts
            .deepgram
            .api_key
            .clone()
            .ok_or_else(|| TtsError::ConfigError("API key required for the Deepgram provider".to_string()))?;

        let defaults = SpeechDefaults::try_from(&tts.defaults)?;
        let client = http_client(tts)?;

        let provider = DeepgramProvider::new(client, api_key, tts.deepgram.base_url.as_ref(), tts.timeout);

        tracing::debug!(
            max_chunk_chars = tts.max_chunk_chars,
            chunk_delay_ms = u64::try_from(tts.chunk_delay.as_millis()).unwrap_or(u64::MAX),
            "TTS server initialized with provider: {}",
            provider.name()
        );

        Ok(Server::with_provider(
            Arc::new(provider),
            defaults,
            tts.max_chunk_chars,
            tts.chunk_delay,
        ))
    }
}
