mod common;

use serde_json::Value;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use partscout::error::PartscoutError;
use partscout::llm::{Content, GenerateRequest, GeminiClient, GenerativeBackend, Part};

use common::{api_error_body, gemini_config, generate_body, mount_upload, GENERATE_PATH};

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new(&gemini_config(server.uri())).expect("client")
}

#[tokio::test]
async fn test_generate_sends_key_and_reads_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": "What is a PSU?" }] }],
            "generationConfig": { "topK": 40, "maxOutputTokens": 8192, "responseMimeType": "text/plain" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(generate_body("A power supply.")))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerateRequest::new(vec![Content::user(vec![Part::text("What is a PSU?")])]);
    let text = client(&server).generate(&request).await.unwrap();

    assert_eq!(text, "A power supply.");
}

#[tokio::test]
async fn test_generate_surfaces_api_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(api_error_body(400, "API key not valid")),
        )
        .mount(&server)
        .await;

    let request = GenerateRequest::new(vec![Content::user(vec![Part::text("hi")])]);
    let err = client(&server).generate(&request).await.unwrap_err();

    match err {
        PartscoutError::Remote(message) => {
            assert!(message.contains("400"), "{message}");
            assert!(message.contains("API key not valid"), "{message}");
        }
        other => panic!("Expected Remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_does_not_retry_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerateRequest::new(vec![Content::user(vec![Part::text("hi")])]);
    let err = client(&server).generate(&request).await.unwrap_err();

    assert!(err.to_string().contains("overloaded"));
}

#[tokio::test]
async fn test_upload_follows_resumable_protocol() {
    let server = MockServer::start().await;
    mount_upload(&server).await;

    let file = client(&server)
        .upload_file(b"\x89PNG fake".to_vec(), "image/png", "gpu.png")
        .await
        .unwrap();

    assert_eq!(file.name, "files/test-upload");
    assert_eq!(file.mime_type, "image/png");
    assert!(file.uri.ends_with("/v1beta/files/test-upload"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let start = &requests[0];
    let header_value = |name: &str| {
        start
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    assert_eq!(
        header_value("x-goog-upload-header-content-length").as_deref(),
        Some("9")
    );
    assert_eq!(
        header_value("x-goog-upload-header-content-type").as_deref(),
        Some("image/png")
    );
    let start_body: Value = serde_json::from_slice(&start.body).unwrap();
    assert_eq!(start_body["file"]["display_name"], "gpu.png");

    let finish = &requests[1];
    assert_eq!(
        finish
            .headers
            .get("x-goog-upload-offset")
            .and_then(|value| value.to_str().ok()),
        Some("0")
    );
    assert_eq!(finish.body, b"\x89PNG fake".to_vec());
}

#[tokio::test]
async fn test_upload_without_session_url_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(common::UPLOAD_START_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = client(&server)
        .upload_file(b"bytes".to_vec(), "image/png", "gpu.png")
        .await
        .unwrap_err();

    assert!(matches!(err, PartscoutError::Remote(_)));
}
