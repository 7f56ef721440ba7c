use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{
    error::TtsError,
    types::{Encoding, SpeechParams},
};

use super::{StreamedAudio, SynthesizedAudio, TtsProvider};

const DEFAULT_DEEPGRAM_API_URL: &str = "https://api.deepgram.com/v1";

/// Bit rates Deepgram accepts for MP3 output
const MP3_BIT_RATES: [u32; 2] = [32_000, 48_000];
const MP3_FALLBACK_BIT_RATE: u32 = 48_000;

/// Deepgram Aura TTS provider
pub struct DeepgramProvider {
    client: Client,
    speak_url: String,
    api_key: SecretString,
    timeout: Duration,
}

impl DeepgramProvider {
    pub fn new(client: Client, api_key: SecretString, base_url: Option<&Url>, timeout: Duration) -> Self {
        let base_url = base_url.map_or(DEFAULT_DEEPGRAM_API_URL, Url::as_str);
        let speak_url = format!("{}/speak", base_url.trim_end_matches('/'));

        Self {
            client,
            speak_url,
            api_key,
            timeout,
        }
    }

    async fn send(&self, text: &str, params: &SpeechParams) -> crate::Result<Response> {
        let query = query_params(params);

        tracing::debug!(
            voice = %params.voice,
            encoding = params.encoding.as_str(),
            input_len = text.chars().count(),
            "Deepgram TTS request"
        );

        let response = self
            .client
            .post(&self.speak_url)
            .header("Authorization", format!("Token {}", self.api_key.expose_secret()))
            .query(&query)
            .json(&DeepgramRequest { text })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Deepgram request failed: {e}");
                TtsError::from_send("Deepgram", &e)
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!("Deepgram API error ({status}): {error_text}");

            return Err(TtsError::from_status(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

#[derive(serde::Serialize)]
struct DeepgramRequest<'a> {
    text: &'a str,
}

#[async_trait]
impl TtsProvider for DeepgramProvider {
    async fn synthesize(&self, text: &str, params: &SpeechParams) -> crate::Result<SynthesizedAudio> {
        let synthesized = tokio::time::timeout(self.timeout, async {
            let response = self.send(text, params).await?;
            let content_type = content_type(&response);

            let audio = response.bytes().await.map_err(|e| {
                tracing::error!("Failed to read Deepgram response body: {e}");
                TtsError::Streaming(format!("Failed to read Deepgram audio: {e}"))
            })?;

            Ok::<_, TtsError>(SynthesizedAudio { audio, content_type })
        })
        .await
        .map_err(|_| TtsError::Timeout)??;

        tracing::debug!("Deepgram TTS synthesis complete, {} bytes", synthesized.audio.len());

        Ok(synthesized)
    }

    async fn synthesize_stream(&self, text: &str, params: &SpeechParams) -> crate::Result<StreamedAudio> {
        let response = tokio::time::timeout(self.timeout, self.send(text, params))
            .await
            .map_err(|_| TtsError::Timeout)??;

        let content_type = content_type(&response);

        // each read must make progress within the call timeout
        let idle = self.timeout;
        let body = stream::unfold(Some(response.bytes_stream().boxed()), move |inner| async move {
            let mut inner = inner?;

            match tokio::time::timeout(idle, inner.next()).await {
                Ok(Some(Ok(bytes))) => Some((Ok(bytes), Some(inner))),
                Ok(Some(Err(e))) => {
                    tracing::error!("Deepgram audio stream interrupted: {e}");
                    Some((
                        Err(TtsError::Streaming(format!("Deepgram audio stream interrupted: {e}"))),
                        None,
                    ))
                }
                Ok(None) => None,
                Err(_) => {
                    tracing::error!("Deepgram audio stream stalled for {idle:?}");
                    Some((Err(TtsError::Timeout), None))
                }
            }
        })
        .boxed();

        Ok(StreamedAudio { body, content_type })
    }

    fn name(&self) -> &str {
        "deepgram"
    }
}

fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Build the `/v1/speak` query string for one call
pub(crate) fn query_params(params: &SpeechParams) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("model", params.voice.clone()),
        ("encoding", params.encoding.as_str().to_string()),
    ];

    if params.encoding.is_bit_rate_encoding() {
        let bit_rate = if params.encoding == Encoding::Mp3 && !MP3_BIT_RATES.contains(&params.bit_rate) {
            MP3_FALLBACK_BIT_RATE
        } else {
            params.bit_rate
        };
        query.push(("bit_rate", bit_rate.to_string()));
    } else {
        query.push(("sample_rate", params.sample_rate.to_string()));
    }

    query.push(("speed", params.speed.to_string()));

    if let Some(pitch) = params.pitch {
        query.push(("pitch", pitch.to_string()));
    }

    query.push(("language", params.language.clone()));
    query.push(("punctuate", params.punctuate.to_string()));
    query.push(("utterance_end_ms", params.utterance_end_ms.to_string()));

    let filler = params.filler_words.to_string();
    query.push(("filler_words", filler.clone()));
    query.push(("disfluencies", filler.clone()));
    query.push(("hesitations", filler));

    query.push(("smart_format", params.smart_format.to_string()));

    if let Some(ref callback_url) = params.callback_url {
        query.push(("callback_url", callback_url.clone()));
        query.push(("callback_method", params.callback_method.clone()));
    }

    if let Some(ref container) = params.container {
        query.push(("container", container.clone()));
    }

    query
}

#[cfg(test)]
mod tests {
    use voicegate_config::SynthesisDefaults;

    use super::*;
    use crate::types::{SpeechDefaults, SynthesisOptions};

    fn params(options: SynthesisOptions) -> SpeechParams {
        let defaults = SpeechDefaults::try_from(&SynthesisDefaults::default()).unwrap();
        options.resolve(&defaults).unwrap()
    }

    fn value<'a>(query: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        query.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn mp3_uses_bit_rate_and_coerces_unsupported_values() {
        let query = query_params(&params(SynthesisOptions::default()));

        assert_eq!(value(&query, "model"), Some("aura-luna-en"));
        assert_eq!(value(&query, "encoding"), Some("mp3"));
        assert_eq!(value(&query, "bit_rate"), Some("48000"));
        assert_eq!(value(&query, "sample_rate"), None);
        assert_eq!(value(&query, "container"), None);
    }

    #[test]
    fn mp3_keeps_supported_bit_rate() {
        let query = query_params(&params(SynthesisOptions {
            bit_rate: Some(32_000),
            ..SynthesisOptions::default()
        }));

        assert_eq!(value(&query, "bit_rate"), Some("32000"));
    }

    #[test]
    fn opus_bit_rate_is_not_coerced() {
        let query = query_params(&params(SynthesisOptions {
            encoding: Some(Encoding::Opus),
            bit_rate: Some(128_000),
            ..SynthesisOptions::default()
        }));

        assert_eq!(value(&query, "bit_rate"), Some("128000"));
    }

    #[test]
    fn pcm_uses_sample_rate() {
        let query = query_params(&params(SynthesisOptions {
            encoding: Some(Encoding::Linear16),
            sample_rate: Some(24_000),
            container: Some("none".to_string()),
            ..SynthesisOptions::default()
        }));

        assert_eq!(value(&query, "sample_rate"), Some("24000"));
        assert_eq!(value(&query, "bit_rate"), None);
        assert_eq!(value(&query, "container"), Some("none"));
    }

    #[test]
    fn filler_words_toggle_related_flags() {
        let query = query_params(&params(SynthesisOptions {
            filler_words: Some(false),
            ..SynthesisOptions::default()
        }));

        assert_eq!(value(&query, "filler_words"), Some("false"));
        assert_eq!(value(&query, "disfluencies"), Some("false"));
        assert_eq!(value(&query, "hesitations"), Some("false"));
    }

    #[test]
    fn callback_is_sent_only_with_url() {
        let query = query_params(&params(SynthesisOptions::default()));
        assert_eq!(value(&query, "callback_method"), None);

        let query = query_params(&params(SynthesisOptions {
            callback_url: Some("https://hooks.example/tts".to_string()),
            callback_method: Some("PUT".to_string()),
            ..SynthesisOptions::default()
        }));
        assert_eq!(value(&query, "callback_url"), Some("https://hooks.example/tts"));
        assert_eq!(value(&query, "callback_method"), Some("put"));
    }

    #[test]
    fn speed_and_pause_are_paced() {
        let query = query_params(&params(SynthesisOptions {
            speed: Some(2.0),
            pitch: Some(-3.5),
            utterance_end_ms: Some(1500),
            ..SynthesisOptions::default()
        }));

        assert_eq!(value(&query, "speed"), Some("1.2"));
        assert_eq!(value(&query, "pitch"), Some("-3.5"));
        assert_eq!(value(&query, "utterance_end_ms"), Some("1500"));
    }

    #[test]
    fn speak_url_joins_base_without_double_slash() {
        let base = Url::parse("http://127.0.0.1:9000/v1/").unwrap();
        let provider = DeepgramProvider::new(
            Client::new(),
            SecretString::from("key"),
            Some(&base),
            Duration::from_secs(1),
        );

        assert_eq!(provider.speak_url, "http://127.0.0.1:9000/v1/speak");
    }
}
