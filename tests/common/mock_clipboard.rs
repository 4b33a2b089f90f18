//! Mock clipboard and copy trigger for testing
//!
//! The trigger "copies" a configured selection into the mock clipboard, the
//! way a focused application would react to Ctrl+C.

use anyhow::Result;
use async_trait::async_trait;
use highlight_ai::clipboard::Clipboard;
use highlight_ai::input::CopyTrigger;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory clipboard that records writes and can be told to fail
#[derive(Debug, Default)]
pub struct MockClipboard {
    content: Mutex<String>,
    /// Every successful write, in order
    pub writes: Mutex<Vec<String>>,
    pub clears: AtomicUsize,
    pub reads: AtomicUsize,
    pub fail_read: AtomicBool,
    pub fail_write: AtomicBool,
    pub fail_clear: AtomicBool,
}

impl MockClipboard {
    pub fn with_content(text: &str) -> Arc<Self> {
        let clipboard = Self::default();
        *clipboard.content.lock().unwrap() = text.to_string();
        Arc::new(clipboard)
    }

    pub fn content(&self) -> String {
        self.content.lock().unwrap().clone()
    }

    /// Set content directly, bypassing the write log
    pub fn set_content(&self, text: &str) {
        *self.content.lock().unwrap() = text.to_string();
    }

    pub fn fail_everything(&self) {
        self.fail_read.store(true, Ordering::SeqCst);
        self.fail_write.store(true, Ordering::SeqCst);
        self.fail_clear.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Clipboard for MockClipboard {
    async fn read(&self) -> Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_read.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Mock clipboard read failure"));
        }
        Ok(self.content())
    }

    async fn write(&self, text: &str) -> Result<()> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Mock clipboard write failure"));
        }
        self.set_content(text);
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Mock clipboard clear failure"));
        }
        self.set_content("");
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Copy trigger that places `selection` on the mock clipboard
pub struct MockTrigger {
    clipboard: Arc<MockClipboard>,
    selection: Mutex<Option<String>>,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl MockTrigger {
    /// `None` simulates a focused app with nothing selected
    pub fn new(clipboard: Arc<MockClipboard>, selection: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            clipboard,
            selection: Mutex::new(selection.map(str::to_string)),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(clipboard: Arc<MockClipboard>) -> Arc<Self> {
        let trigger = Self::new(clipboard, None);
        trigger.fail.store(true, Ordering::SeqCst);
        trigger
    }

    pub fn set_selection(&self, selection: Option<&str>) {
        *self.selection.lock().unwrap() = selection.map(str::to_string);
    }
}

#[async_trait]
impl CopyTrigger for MockTrigger {
    async fn trigger_copy(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Mock copy failure"));
        }
        if let Some(selection) = self.selection.lock().unwrap().clone() {
            self.clipboard.set_content(&selection);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
