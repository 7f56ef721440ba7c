use std::str::FromStr;

use serde::Deserialize;
use voicegate_config::SynthesisDefaults;

use crate::error::TtsError;

/// Body of `POST /tts`
///
/// Synthesis options mirror the Deepgram `/v1/speak` query parameters and
/// fall back to the configured defaults when omitted.
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    /// Text to synthesize
    pub text: String,
    /// Response mode, `download` when omitted
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(flatten)]
    pub options: SynthesisOptions,
}

/// How the audio is delivered to the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Whole payload once every chunk is synthesized
    #[default]
    #[serde(alias = "file")]
    Download,
    /// Bytes relayed as they arrive from the provider
    Stream,
}

impl Mode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Stream => "stream",
        }
    }
}

/// Optional synthesis parameters supplied by the caller
#[derive(Debug, Default, Deserialize)]
pub struct SynthesisOptions {
    /// Deepgram voice model (e.g. `aura-luna-en`)
    pub voice: Option<String>,
    pub encoding: Option<Encoding>,
    pub sample_rate: Option<u32>,
    pub bit_rate: Option<u32>,
    /// Speech speed multiplier
    pub speed: Option<f64>,
    /// Pitch adjustment in semitones
    pub pitch: Option<f64>,
    pub language: Option<String>,
    pub punctuate: Option<bool>,
    /// Silence appended after each utterance
    pub utterance_end_ms: Option<u32>,
    /// Natural filler words, disfluencies and hesitations
    pub filler_words: Option<bool>,
    pub smart_format: Option<bool>,
    pub callback_url: Option<String>,
    pub callback_method: Option<String>,
    /// Output container (`wav`, `ogg`, `none`)
    pub container: Option<String>,
}

/// Upper bound applied to the caller's speed
pub const MAX_SPEED: f64 = 1.2;
/// Speed used when the caller does not set one
pub const DEFAULT_SPEED: f64 = 0.95;
/// Lower bound applied to the caller's utterance pause
pub const MIN_UTTERANCE_END_MS: u32 = 800;
/// Utterance pause used when the caller does not set one
pub const DEFAULT_UTTERANCE_END_MS: u32 = 1200;

/// Fully resolved parameters for one upstream call
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechParams {
    pub voice: String,
    pub encoding: Encoding,
    pub sample_rate: u32,
    pub bit_rate: u32,
    pub speed: f64,
    pub pitch: Option<f64>,
    pub language: String,
    pub punctuate: bool,
    pub utterance_end_ms: u32,
    pub filler_words: bool,
    pub smart_format: bool,
    pub callback_url: Option<String>,
    pub callback_method: String,
    pub container: Option<String>,
}

impl SynthesisOptions {
    /// Merge with configured defaults and apply pacing bounds
    pub fn resolve(self, defaults: &SpeechDefaults) -> crate::Result<SpeechParams> {
        if let Some(speed) = self.speed
            && !(speed.is_finite() && speed > 0.0)
        {
            return Err(TtsError::InvalidRequest(format!("speed must be a positive number, got {speed}")));
        }

        if let Some(pitch) = self.pitch
            && !pitch.is_finite()
        {
            return Err(TtsError::InvalidRequest("pitch must be a finite number".to_string()));
        }

        let voice = self
            .voice
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| defaults.voice.clone());

        Ok(SpeechParams {
            voice,
            encoding: self.encoding.unwrap_or(defaults.encoding),
            sample_rate: self.sample_rate.unwrap_or(defaults.sample_rate),
            bit_rate: self.bit_rate.unwrap_or(defaults.bit_rate),
            speed: self.speed.map_or(DEFAULT_SPEED, |s| s.min(MAX_SPEED)),
            pitch: self.pitch,
            language: self
                .language
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| defaults.language.clone()),
            punctuate: self.punctuate.unwrap_or(true),
            utterance_end_ms: self
                .utterance_end_ms
                .map_or(DEFAULT_UTTERANCE_END_MS, |ms| ms.max(MIN_UTTERANCE_END_MS)),
            filler_words: self.filler_words.unwrap_or(true),
            smart_format: self.smart_format.unwrap_or(true),
            callback_url: self.callback_url.filter(|u| !u.trim().is_empty()),
            callback_method: self
                .callback_method
                .filter(|m| !m.trim().is_empty())
                .map_or_else(|| "post".to_string(), |m| m.trim().to_lowercase()),
            container: self.container.filter(|c| !c.trim().is_empty()),
        })
    }
}

/// Configured fallbacks with the encoding already parsed
#[derive(Debug, Clone)]
pub struct SpeechDefaults {
    pub voice: String,
    pub encoding: Encoding,
    pub sample_rate: u32,
    pub bit_rate: u32,
    pub language: String,
}

impl TryFrom<&SynthesisDefaults> for SpeechDefaults {
    type Error = TtsError;

    fn try_from(defaults: &SynthesisDefaults) -> Result<Self, Self::Error> {
        let encoding = defaults
            .encoding
            .parse()
            .map_err(|e| TtsError::ConfigError(format!("tts.defaults.encoding: {e}")))?;

        Ok(Self {
            voice: defaults.voice.clone(),
            encoding,
            sample_rate: defaults.sample_rate,
            bit_rate: defaults.bit_rate,
            language: defaults.language.clone(),
        })
    }
}

/// Audio encodings accepted by Deepgram `/v1/speak`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Mp3,
    Linear16,
    Mulaw,
    Alaw,
    Opus,
    Flac,
    Aac,
}

impl Encoding {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Linear16 => "linear16",
            Self::Mulaw => "mulaw",
            Self::Alaw => "alaw",
            Self::Opus => "opus",
            Self::Flac => "flac",
            Self::Aac => "aac",
        }
    }

    /// Lossy encodings take a bit rate instead of a sample rate
    pub const fn is_bit_rate_encoding(self) -> bool {
        matches!(self, Self::Mp3 | Self::Aac | Self::Opus)
    }

    /// Whether payloads from separate calls can be joined byte-for-byte
    ///
    /// MP3 and ADTS AAC are sequences of self-contained frames, and bare PCM
    /// has no header. WAV, Ogg and FLAC wrap each payload in a header that
    /// describes only that payload.
    pub fn concatenates(self, container: Option<&str>) -> bool {
        match self {
            Self::Mp3 | Self::Aac => true,
            Self::Linear16 | Self::Mulaw | Self::Alaw => container == Some("none"),
            Self::Opus | Self::Flac => false,
        }
    }

    /// Content type and file extension of the audio Deepgram returns
    pub fn format(self, container: Option<&str>) -> AudioFormat {
        match (self, container) {
            (Self::Linear16 | Self::Mulaw | Self::Alaw, Some("none")) => AudioFormat {
                content_type: "application/octet-stream",
                extension: "raw",
            },
            (Self::Mp3, _) => AudioFormat {
                content_type: "audio/mpeg",
                extension: "mp3",
            },
            (Self::Linear16 | Self::Mulaw | Self::Alaw, _) => AudioFormat {
                content_type: "audio/wav",
                extension: "wav",
            },
            (Self::Opus, _) => AudioFormat {
                content_type: "audio/ogg",
                extension: "ogg",
            },
            (Self::Flac, _) => AudioFormat {
                content_type: "audio/flac",
                extension: "flac",
            },
            (Self::Aac, _) => AudioFormat {
                content_type: "audio/aac",
                extension: "aac",
            },
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "linear16" => Ok(Self::Linear16),
            "mulaw" => Ok(Self::Mulaw),
            "alaw" => Ok(Self::Alaw),
            "opus" => Ok(Self::Opus),
            "flac" => Ok(Self::Flac),
            "aac" => Ok(Self::Aac),
            other => Err(format!("unsupported encoding '{other}'")),
        }
    }
}

/// Content type and file extension for an encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub content_type: &'static str,
    pub extension: &'static str,
}
