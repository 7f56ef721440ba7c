//! TTS metric instruments

use std::sync::OnceLock;
use std::time::Instant;

use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram};

pub const TTS_REQUEST_COUNT: &str = "tts.request.count";
pub const TTS_REQUEST_DURATION: &str = "tts.request.duration";
pub const TTS_UPSTREAM_ERROR_COUNT: &str = "tts.upstream.error.count";

/// Instruments recorded by the TTS endpoint
///
/// Bound to the global meter provider on first use, so telemetry must be
/// initialized before the first request for the values to be exported.
pub struct TtsMetrics {
    requests: Counter<u64>,
    duration: Histogram<f64>,
    upstream_errors: Counter<u64>,
}

impl TtsMetrics {
    pub fn global() -> &'static Self {
        static METRICS: OnceLock<TtsMetrics> = OnceLock::new();

        METRICS.get_or_init(|| {
            let meter = global::meter("voicegate");

            Self {
                requests: meter
                    .u64_counter(TTS_REQUEST_COUNT)
                    .with_description("TTS requests accepted past authentication")
                    .build(),
                duration: meter
                    .f64_histogram(TTS_REQUEST_DURATION)
                    .with_description("Time until the response started (stream) or completed (download)")
                    .with_unit("s")
                    .build(),
                upstream_errors: meter
                    .u64_counter(TTS_UPSTREAM_ERROR_COUNT)
                    .with_description("Failed calls to the upstream TTS provider")
                    .build(),
            }
        })
    }

    pub fn record_request(&self, mode: &'static str, chunks: usize) {
        self.requests.add(
            1,
            &[
                KeyValue::new("mode", mode),
                KeyValue::new("multi_chunk", chunks > 1),
            ],
        );
    }

    pub fn record_duration(&self, mode: &'static str, start: Instant, success: bool) {
        self.duration.record(
            start.elapsed().as_secs_f64(),
            &[KeyValue::new("mode", mode), KeyValue::new("success", success)],
        );
    }

    pub fn record_upstream_error(&self, provider: &str, status: Option<u16>) {
        let status = status.map_or_else(|| "connection".to_string(), |s| s.to_string());

        self.upstream_errors.add(
            1,
            &[
                KeyValue::new("provider", provider.to_string()),
                KeyValue::new("status", status),
            ],
        );
    }
}
