mod harness;

use std::time::Duration;

use futures::StreamExt;
use harness::config::ConfigBuilder;
use harness::mock_deepgram::{MockDeepgram, audio_for};
use harness::server::TestServer;

fn stream_body(text: &str) -> serde_json::Value {
    serde_json::json!({ "text": text, "mode": "stream" })
}

#[tokio::test]
async fn stream_returns_audio_body() {
    let mock = MockDeepgram::start().await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.base_url()).build())
        .await
        .unwrap();

    let resp = server.tts(&stream_body("hello")).send().await.unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "audio/mpeg");
    assert_eq!(resp.headers()["cache-control"], "no-cache");
    assert!(!resp.headers().contains_key("content-length"));
    assert!(!resp.headers().contains_key("content-disposition"));

    let body = resp.bytes().await.unwrap();
    assert_eq!(body.as_ref(), audio_for("hello").as_bytes());
}

#[tokio::test]
async fn first_bytes_arrive_before_upstream_completes() {
    let mock = MockDeepgram::start_holding().await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.base_url()).build())
        .await
        .unwrap();

    let resp = server.tts(&stream_body("hello")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let mut body = Box::pin(resp.bytes_stream());

    let first = tokio::time::timeout(Duration::from_secs(5), body.next())
        .await
        .expect("first bytes should arrive while upstream is held")
        .unwrap()
        .unwrap();

    assert!(!first.is_empty());
    assert!(b"AUDIO[".starts_with(&first));
    assert!(!mock.completed());

    mock.release();

    let mut received = first.to_vec();
    while let Some(chunk) = body.next().await {
        received.extend_from_slice(&chunk.unwrap());
    }

    assert!(mock.completed());
    assert_eq!(received, audio_for("hello").into_bytes());
}

#[tokio::test]
async fn long_text_streams_chunks_in_order() {
    let mock = MockDeepgram::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).with_max_chunk_chars(12).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .tts(&stream_body("First one. Second one. Third one."))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);

    let body = resp.text().await.unwrap();
    let texts: Vec<String> = mock.calls().into_iter().map(|call| call.text).collect();

    assert_eq!(texts, vec!["First one.", "Second one.", "Third one."]);
    assert_eq!(body, texts.iter().map(|text| audio_for(text)).collect::<String>());
}
