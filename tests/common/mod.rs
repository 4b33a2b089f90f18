#![allow(dead_code)]

pub mod mock_clipboard;
pub mod mock_server;

use highlight_ai::selection::SelectionCapture;
use mock_clipboard::{MockClipboard, MockTrigger};
use std::sync::Arc;
use std::time::Duration;

/// Settling delay used by tests; the mocks copy synchronously
pub const TEST_SETTLE: Duration = Duration::from_millis(5);

pub fn capture_with(clipboard: Arc<MockClipboard>, trigger: Arc<MockTrigger>) -> SelectionCapture {
    SelectionCapture::new(clipboard, trigger).with_settle_delay(TEST_SETTLE)
}

/// Body of a successful completion whose content is `text`
pub fn completion_body(text: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}
