use highlight_ai::config::Config;
use highlight_ai::core::CompletionClient;
use highlight_ai::error::CompletionError;
use std::time::{Duration, Instant};

mod common;
use common::completion_body;
use common::mock_server::{serve_hang, serve_once, unreachable_base_url};

fn client_for(base_url: &str) -> CompletionClient {
    CompletionClient::new(&Config {
        base_url: base_url.to_string(),
        model_name: "test-model".to_string(),
    })
}

#[tokio::test]
async fn test_send_chat_returns_content() {
    let (base_url, server) =
        serve_once("200 OK", r#"{"choices":[{"message":{"content":"Hi"}}]}"#).await;

    let reply = client_for(&base_url).send_chat("Hello").await.unwrap();
    assert_eq!(reply, "Hi");
    server.await.unwrap();
}

#[tokio::test]
async fn test_request_shape() {
    let (base_url, server) = serve_once("200 OK", &completion_body("ok")).await;

    client_for(&base_url)
        .send_chat("Explain this:\n\nfn main() {}")
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert_eq!(request.request_line, "POST /v1/chat/completions HTTP/1.1");
    assert!(request.headers.contains("content-type: application/json"));

    let body = request.json();
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "Explain this:\n\nfn main() {}");
    assert_eq!(body["stream"], false);
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
}

#[tokio::test]
async fn test_content_is_returned_verbatim() {
    let (base_url, _server) = serve_once("200 OK", &completion_body("  spaced\n\n")).await;

    let reply = client_for(&base_url).send_chat("x").await.unwrap();
    assert_eq!(reply, "  spaced\n\n");
}

#[tokio::test]
async fn test_server_error_is_protocol_failure() {
    let long_body = format!("{{\"error\":\"{}\"}}", "x".repeat(500));
    let (base_url, _server) = serve_once("500 Internal Server Error", &long_body).await;

    let err = client_for(&base_url).send_chat("Hello").await.unwrap_err();
    assert!(err.to_string().contains("500"), "unexpected message: {err}");
    match err {
        CompletionError::Protocol { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body.chars().count(), 200);
        }
        other => panic!("expected Protocol failure, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_is_protocol_failure() {
    let (base_url, _server) = serve_once("404 Not Found", "no such route").await;

    let err = client_for(&base_url).send_chat("Hello").await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test]
async fn test_empty_choices_is_empty_response() {
    let (base_url, _server) = serve_once("200 OK", r#"{"choices":[]}"#).await;

    let err = client_for(&base_url).send_chat("Hello").await.unwrap_err();
    assert!(
        matches!(err, CompletionError::EmptyResponse),
        "expected EmptyResponse, got: {err:?}"
    );
}

#[tokio::test]
async fn test_missing_choices_is_empty_response() {
    let (base_url, _server) = serve_once("200 OK", r#"{"object":"chat.completion"}"#).await;

    let err = client_for(&base_url).send_chat("Hello").await.unwrap_err();
    assert!(matches!(err, CompletionError::EmptyResponse));
}

#[tokio::test]
async fn test_non_json_body_is_parse_failure() {
    let (base_url, _server) = serve_once("200 OK", "<html>LM Studio</html>").await;

    let err = client_for(&base_url).send_chat("Hello").await.unwrap_err();
    assert!(
        matches!(err, CompletionError::Parse(_)),
        "expected Parse failure, got: {err:?}"
    );
}

#[tokio::test]
async fn test_unreachable_host_is_transport_failure() {
    let base_url = unreachable_base_url().await;

    let err = client_for(&base_url).send_chat("Hello").await.unwrap_err();
    assert!(err.to_string().contains(&base_url), "unexpected message: {err}");
    assert!(
        matches!(err, CompletionError::Transport { .. }),
        "expected Transport failure, got: {err:?}"
    );
}

#[tokio::test]
async fn test_invalid_base_url_is_classified() {
    let err = client_for("not a url").send_chat("Hello").await.unwrap_err();
    assert!(matches!(
        err,
        CompletionError::InvalidEndpoint { .. } | CompletionError::Transport { .. }
    ));
}

#[tokio::test]
async fn test_hung_server_times_out() {
    let (base_url, _server) = serve_hang().await;
    let timeout = Duration::from_millis(300);
    let client = CompletionClient::with_timeout(
        &Config {
            base_url,
            model_name: "test-model".to_string(),
        },
        timeout,
    );

    let start = Instant::now();
    let err = client.send_chat("Hello").await.unwrap_err();
    let elapsed = start.elapsed();

    assert!(
        matches!(err, CompletionError::Timeout { after } if after == timeout),
        "expected Timeout, got: {err:?}"
    );
    assert!(err.to_string().contains("300ms"), "unexpected message: {err}");
    assert!(elapsed >= timeout, "timed out too early: {elapsed:?}");
    assert!(
        elapsed < timeout + Duration::from_secs(2),
        "timed out too late: {elapsed:?}"
    );
}
