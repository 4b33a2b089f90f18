//! Synthetic "copy selection" keystrokes
//!
//! Three backends:
//! - `uinput`: a native evdev virtual keyboard, works on X11 and Wayland
//!   (needs write access to `/dev/uinput`)
//! - `xdotool`: X11 only
//! - `osascript`: macOS System Events

use crate::platform::{self, Platform};
use anyhow::{Context, Result};
use async_trait::async_trait;
use evdev::{uinput::VirtualDeviceBuilder, AttributeSet, Key};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Something that can make the focused application copy its selection
#[async_trait]
pub trait CopyTrigger: Send + Sync {
    /// Fire the platform copy shortcut once
    async fn trigger_copy(&self) -> Result<()>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// Which copy backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CopyBackend {
    /// Pick from the detected platform
    Auto,
    Uinput,
    Xdotool,
    Osascript,
}

impl CopyBackend {
    /// Resolve `Auto` against the running platform
    pub fn resolve(self, platform: Platform) -> CopyBackend {
        match (self, platform) {
            (CopyBackend::Auto, Platform::MacOs) => CopyBackend::Osascript,
            (CopyBackend::Auto, Platform::X11) => CopyBackend::Xdotool,
            (CopyBackend::Auto, Platform::Wayland) => CopyBackend::Uinput,
            (backend, _) => backend,
        }
    }
}

/// Build the copy trigger for a backend
pub fn create_trigger(backend: CopyBackend, platform: Platform) -> Result<Arc<dyn CopyTrigger>> {
    let trigger: Arc<dyn CopyTrigger> = match backend.resolve(platform) {
        CopyBackend::Uinput => Arc::new(UinputCopy::new()?),
        CopyBackend::Xdotool => Arc::new(XdotoolCopy),
        CopyBackend::Osascript | CopyBackend::Auto => Arc::new(OsascriptCopy),
    };
    info!("⌨️ Copy backend: {}", trigger.name());
    Ok(trigger)
}

/// Keys the virtual keyboard can emit: Ctrl+C and nothing else
const COPY_KEYS: [Key; 2] = [Key::KEY_LEFTCTRL, Key::KEY_C];

/// Virtual keyboard for simulating key presses
pub struct VirtualKeyboard {
    device: evdev::uinput::VirtualDevice,
}

impl VirtualKeyboard {
    /// Create a new virtual keyboard device
    pub fn new() -> Result<Self> {
        let mut keys = AttributeSet::<Key>::new();
        for key in COPY_KEYS {
            keys.insert(key);
        }

        let device = VirtualDeviceBuilder::new()?
            .name("Highlight AI Virtual Keyboard")
            .with_keys(&keys)?
            .build()
            .context("Failed to create virtual keyboard")?;

        info!("⌨️ Virtual keyboard created");
        Ok(Self { device })
    }

    /// Press and release a single key
    pub fn tap_key(&mut self, key: Key) -> Result<()> {
        self.press_key(key)?;
        thread::sleep(Duration::from_millis(10));
        self.release_key(key)?;
        Ok(())
    }

    pub fn press_key(&mut self, key: Key) -> Result<()> {
        debug!("Key down: {:?}", key);
        self.device.emit(&[evdev::InputEvent::new(
            evdev::EventType::KEY,
            key.code(),
            1,
        )])?;
        Ok(())
    }

    pub fn release_key(&mut self, key: Key) -> Result<()> {
        debug!("Key up: {:?}", key);
        self.device.emit(&[evdev::InputEvent::new(
            evdev::EventType::KEY,
            key.code(),
            0,
        )])?;
        Ok(())
    }

    /// Type a key combination (e.g., Ctrl+C)
    pub fn key_combo(&mut self, modifiers: &[Key], key: Key) -> Result<()> {
        for modifier in modifiers {
            self.press_key(*modifier)?;
            thread::sleep(Duration::from_millis(5));
        }

        self.tap_key(key)?;

        for modifier in modifiers.iter().rev() {
            self.release_key(*modifier)?;
            thread::sleep(Duration::from_millis(5));
        }

        Ok(())
    }
}

/// Ctrl+C through an evdev uinput device
pub struct UinputCopy {
    keyboard: Arc<Mutex<VirtualKeyboard>>,
}

impl UinputCopy {
    pub fn new() -> Result<Self> {
        let keyboard = VirtualKeyboard::new().context(
            "uinput unavailable; add your user to the 'input' group or use --copy-backend xdotool",
        )?;
        Ok(Self {
            keyboard: Arc::new(Mutex::new(keyboard)),
        })
    }
}

#[async_trait]
impl CopyTrigger for UinputCopy {
    async fn trigger_copy(&self) -> Result<()> {
        let keyboard = self.keyboard.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut keyboard = keyboard
                .lock()
                .map_err(|e| anyhow::anyhow!("Virtual keyboard lock poisoned: {}", e))?;
            keyboard.key_combo(&[Key::KEY_LEFTCTRL], Key::KEY_C)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    fn name(&self) -> &str {
        "uinput"
    }
}

/// Ctrl+C through `xdotool`
#[derive(Debug, Default)]
pub struct XdotoolCopy;

#[async_trait]
impl CopyTrigger for XdotoolCopy {
    async fn trigger_copy(&self) -> Result<()> {
        platform::run_status("xdotool", &["key", "--clearmodifiers", "ctrl+c"]).await
    }

    fn name(&self) -> &str {
        "xdotool"
    }
}

/// Cmd+C through AppleScript System Events
#[derive(Debug, Default)]
pub struct OsascriptCopy;

const OSASCRIPT_COPY: &str =
    "tell application \"System Events\" to keystroke \"c\" using command down";

#[async_trait]
impl CopyTrigger for OsascriptCopy {
    async fn trigger_copy(&self) -> Result<()> {
        platform::run_status("osascript", &["-e", OSASCRIPT_COPY]).await
    }

    fn name(&self) -> &str {
        "osascript"
    }
}
