//! Selection Capture
//!
//! Reads the text selected in whichever application has focus by forcing a
//! copy and reading the clipboard, then puts the previous clipboard back.
//!
//! The sequence per capture is strictly:
//! clipboard read → synthetic copy → settling delay → clipboard read → restore.
//! Restore runs in the background; the next capture waits for it first so two
//! captures never interleave their snapshots.

use crate::clipboard::Clipboard;
use crate::error::CaptureError;
use crate::input::CopyTrigger;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Time the OS gets to apply the clipboard write after the synthetic copy.
/// Fixed; there is no poll for the clipboard actually changing.
pub const SETTLE_DELAY: Duration = Duration::from_millis(250);

pub struct SelectionCapture {
    clipboard: Arc<dyn Clipboard>,
    trigger: Arc<dyn CopyTrigger>,
    settle_delay: Duration,
    pending_restore: Mutex<Option<JoinHandle<()>>>,
}

impl SelectionCapture {
    pub fn new(clipboard: Arc<dyn Clipboard>, trigger: Arc<dyn CopyTrigger>) -> Self {
        Self {
            clipboard,
            trigger,
            settle_delay: SETTLE_DELAY,
            pending_restore: Mutex::new(None),
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Capture the current selection, trimmed.
    ///
    /// Never fails: any error yields an empty string, which callers treat the
    /// same as "nothing selected".
    pub async fn capture(&self) -> String {
        self.wait_for_restore().await;

        match self.try_capture().await {
            Ok(text) => {
                info!("✂️ Selected text length: {}", text.len());
                text
            }
            Err(e) => {
                warn!("⚠️ Error getting selected text: {}", e);
                String::new()
            }
        }
    }

    /// Wait until the clipboard restore from the previous capture is done
    pub async fn wait_for_restore(&self) {
        let pending = self.pending_restore.lock().await.take();
        if let Some(handle) = pending {
            if let Err(e) = handle.await {
                debug!("Clipboard restore task ended abnormally: {}", e);
            }
        }
    }

    async fn try_capture(&self) -> Result<String, CaptureError> {
        let prior = match self.clipboard.read().await {
            Ok(text) => text,
            Err(e) => {
                debug!("Clipboard read failed, treating as empty: {}", e);
                String::new()
            }
        };

        let copied = self.trigger.trigger_copy().await;

        // The copy may have landed even if the trigger reported an error
        let selection = match copied {
            Ok(()) => {
                tokio::time::sleep(self.settle_delay).await;
                self.clipboard
                    .read()
                    .await
                    .map_err(|e| CaptureError::Clipboard(e.to_string()))
            }
            Err(e) => Err(CaptureError::Copy(e.to_string())),
        };

        self.schedule_restore(prior).await;

        Ok(selection?.trim().to_string())
    }

    async fn schedule_restore(&self, prior: String) {
        let clipboard = self.clipboard.clone();
        let handle = tokio::spawn(async move {
            let result = if prior.is_empty() {
                clipboard.clear().await
            } else {
                clipboard.write(&prior).await
            };
            match result {
                Ok(()) => debug!("Clipboard restored ({} chars)", prior.len()),
                Err(e) => warn!("⚠️ Clipboard restore failed: {}", e),
            }
        });
        *self.pending_restore.lock().await = Some(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct StaticClipboard(std::sync::Mutex<String>);

    #[async_trait]
    impl Clipboard for StaticClipboard {
        async fn read(&self) -> Result<String> {
            Ok(self.0.lock().unwrap().clone())
        }
        async fn write(&self, text: &str) -> Result<()> {
            *self.0.lock().unwrap() = text.to_string();
            Ok(())
        }
        async fn clear(&self) -> Result<()> {
            self.0.lock().unwrap().clear();
            Ok(())
        }
    }

    struct NoopTrigger;

    #[async_trait]
    impl CopyTrigger for NoopTrigger {
        async fn trigger_copy(&self) -> Result<()> {
            Ok(())
        }
        fn name(&self) -> &str {
            "noop"
        }
    }

    #[test]
    fn test_default_settle_delay() {
        let capture = SelectionCapture::new(
            Arc::new(StaticClipboard(std::sync::Mutex::new(String::new()))),
            Arc::new(NoopTrigger),
        );
        assert_eq!(capture.settle_delay(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_capture_waits_settle_delay() {
        let capture = SelectionCapture::new(
            Arc::new(StaticClipboard(std::sync::Mutex::new("  kept  ".into()))),
            Arc::new(NoopTrigger),
        );
        let start = tokio::time::Instant::now();
        let text = capture.capture().await;
        assert!(start.elapsed() >= SETTLE_DELAY);
        // Nothing new was copied, so the clipboard text itself is returned
        assert_eq!(text, "kept");
    }
}
