//! WAV assembly for linear16 audio synthesized in several calls

use std::io::Cursor;

use bytes::Bytes;
use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::TtsError;

/// Wrap little-endian 16-bit mono PCM in a single WAV header
///
/// A trailing odd byte cannot form a sample and is dropped.
pub fn linear16_wav(pcm: &[u8], sample_rate: u32) -> crate::Result<Bytes> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut buffer = Vec::with_capacity(pcm.len() + 44);
    {
        let mut writer = WavWriter::new(Cursor::new(&mut buffer), spec)
            .map_err(|e| TtsError::InternalError(Some(format!("Failed to create WAV writer: {e}"))))?;

        for sample in pcm.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([sample[0], sample[1]]))
                .map_err(|e| TtsError::InternalError(Some(format!("Failed to write WAV sample: {e}"))))?;
        }

        writer
            .finalize()
            .map_err(|e| TtsError::InternalError(Some(format!("Failed to finalize WAV: {e}"))))?;
    }

    Ok(Bytes::from(buffer))
}
