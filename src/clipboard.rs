//! System clipboard access
//!
//! Backed by the platform's clipboard tools:
//! - macOS: `pbpaste`, restore through `osascript`
//! - Wayland: `wl-paste` / `wl-copy`
//! - X11: `xclip`

use crate::platform::{self, Platform};
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// Read/write access to a text clipboard
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Current clipboard text
    async fn read(&self) -> Result<String>;

    /// Replace the clipboard text
    async fn write(&self, text: &str) -> Result<()>;

    /// Empty the clipboard
    async fn clear(&self) -> Result<()>;
}

/// Clipboard driven by the desktop's command line tools
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    platform: Platform,
}

impl SystemClipboard {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn read(&self) -> Result<String> {
        match self.platform {
            Platform::MacOs => platform::run_capture("pbpaste", &[]).await,
            Platform::Wayland => platform::run_capture("wl-paste", &["--no-newline"]).await,
            Platform::X11 => {
                platform::run_capture("xclip", &["-selection", "clipboard", "-o"]).await
            }
        }
    }

    async fn write(&self, text: &str) -> Result<()> {
        debug!("Writing {} chars to clipboard", text.len());
        match self.platform {
            Platform::MacOs => {
                let script = format!("set the clipboard to {}", applescript_quote(text));
                platform::run_status("osascript", &["-e", script.as_str()]).await
            }
            Platform::Wayland => platform::run_with_stdin("wl-copy", &[], text).await,
            Platform::X11 => {
                platform::run_with_stdin("xclip", &["-selection", "clipboard", "-i"], text).await
            }
        }
    }

    async fn clear(&self) -> Result<()> {
        match self.platform {
            Platform::MacOs => {
                platform::run_status("osascript", &["-e", "set the clipboard to \"\""]).await
            }
            Platform::Wayland => platform::run_status("wl-copy", &["--clear"]).await,
            Platform::X11 => {
                platform::run_with_stdin("xclip", &["-selection", "clipboard", "-i"], "").await
            }
        }
    }
}

/// Quote text as an AppleScript string literal.
///
/// The restore script is the one place user-controlled text reaches a script
/// interpreter. Backslashes and quotes are escaped; control characters that
/// AppleScript cannot hold literally are emitted as escapes or joined via
/// `ASCII character`.
pub fn applescript_quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\" & (ASCII character {}) & \"", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
