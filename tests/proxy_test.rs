//! Proxy variables are process-wide, so this lives in its own test binary.

use highlight_ai::config::Config;
use highlight_ai::core::CompletionClient;

mod common;
use common::mock_server::serve_once;

#[tokio::test]
async fn test_send_chat_ignores_proxy_environment() {
    // Nothing listens on port 9; a proxied request would fail to connect
    for var in ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"] {
        std::env::set_var(var, "http://127.0.0.1:9");
    }

    let (base_url, server) =
        serve_once("200 OK", r#"{"choices":[{"message":{"content":"Hi"}}]}"#).await;
    let client = CompletionClient::new(&Config {
        base_url,
        model_name: "test-model".to_string(),
    });

    let reply = client.send_chat("Hello").await.unwrap();
    assert_eq!(reply, "Hi");

    let request = server.await.unwrap();
    assert_eq!(request.request_line, "POST /v1/chat/completions HTTP/1.1");
}
