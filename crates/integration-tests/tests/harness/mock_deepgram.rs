//! Mock Deepgram backend for integration tests
//!
//! Serves `POST /v1/speak` and answers each call with `AUDIO[<text>]` so tests
//! can tell which chunk produced which bytes. `linear16` calls get one PCM
//! sample per text byte instead, as a WAV file unless `container=none`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use bytes::Bytes;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// A call received by the mock
#[derive(Debug, Clone)]
pub struct SpeakCall {
    pub text: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Behavior {
    /// Answer with the whole payload at once
    Audio,
    /// Answer with the given status and a Deepgram-style error body
    Fail(u16),
    /// Send `AUDIO[` immediately and the rest only after `release`
    Hold,
}

/// Mock Deepgram backend
pub struct MockDeepgram {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    behavior: Behavior,
    request_count: AtomicU32,
    calls: Mutex<Vec<SpeakCall>>,
    release: Notify,
    completed: AtomicBool,
}

impl MockDeepgram {
    /// Start a mock that synthesizes every call
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Audio).await
    }

    /// Start a mock that rejects every call with `status`
    pub async fn start_failing(status: u16) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Fail(status)).await
    }

    /// Start a mock that holds back the end of each payload until `release`
    pub async fn start_holding() -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Hold).await
    }

    async fn start_inner(behavior: Behavior) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            behavior,
            request_count: AtomicU32::new(0),
            calls: Mutex::new(Vec::new()),
            release: Notify::new(),
            completed: AtomicBool::new(false),
        });

        let app = Router::new()
            .route("/v1/speak", routing::post(handle_speak))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the Deepgram endpoint
    ///
    /// Includes `/v1` since the provider appends `/speak`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of speak requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::SeqCst)
    }

    /// Calls received so far, in arrival order
    pub fn calls(&self) -> Vec<SpeakCall> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Let a held payload finish
    pub fn release(&self) {
        self.state.release.notify_one();
    }

    /// Whether a held payload has been sent in full
    pub fn completed(&self) -> bool {
        self.state.completed.load(Ordering::SeqCst)
    }
}

impl Drop for MockDeepgram {
    fn drop(&mut self) {
        // unblock any held response so graceful shutdown can finish
        self.state.release.notify_waiters();
        self.shutdown.cancel();
    }
}

/// Audio the mock returns for `text`
pub fn audio_for(text: &str) -> String {
    format!("AUDIO[{text}]")
}

/// PCM samples the mock returns for `text` in linear16
pub fn pcm_for(text: &str) -> Vec<i16> {
    text.bytes().map(|b| i16::from(b) * 100).collect()
}

/// A complete 16-bit mono WAV file holding `samples`
pub fn wav_file(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut buffer), spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    buffer
}

#[derive(Debug, Deserialize)]
struct SpeakBody {
    text: String,
}

async fn handle_speak(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<SpeakBody>,
) -> Response {
    state.request_count.fetch_add(1, Ordering::SeqCst);
    state.calls.lock().unwrap().push(SpeakCall {
        text: body.text.clone(),
        query: query.clone(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    });

    let behavior = state.behavior;

    match behavior {
        Behavior::Audio if query.get("encoding").is_some_and(|e| e == "linear16") => {
            let samples = pcm_for(&body.text);

            if query.get("container").is_some_and(|c| c == "none") {
                let raw: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
                ([(header::CONTENT_TYPE, "application/octet-stream")], raw).into_response()
            } else {
                let sample_rate = query
                    .get("sample_rate")
                    .and_then(|rate| rate.parse().ok())
                    .unwrap_or(24_000);
                ([(header::CONTENT_TYPE, "audio/wav")], wav_file(&samples, sample_rate)).into_response()
            }
        }
        Behavior::Audio => ([(header::CONTENT_TYPE, "audio/mpeg")], audio_for(&body.text)).into_response(),
        Behavior::Fail(status) => {
            let status = StatusCode::from_u16(status).unwrap();
            let error = serde_json::json!({
                "err_code": "MOCK_FAILURE",
                "err_msg": format!("mock failure with status {}", status.as_u16()),
            });
            (status, Json(error)).into_response()
        }
        Behavior::Hold => {
            let head = futures::stream::once(async { Ok::<_, Infallible>(Bytes::from_static(b"AUDIO[")) });
            let tail = futures::stream::once(async move {
                state.release.notified().await;
                state.completed.store(true, Ordering::SeqCst);
                Ok(Bytes::from(format!("{}]", body.text)))
            });

            ([(header::CONTENT_TYPE, "audio/mpeg")], Body::from_stream(head.chain(tail))).into_response()
        }
    }
}
