//! Global hotkey
//!
//! Listens to system-wide key events with rdev on a dedicated thread and
//! reports each completed chord over a tokio channel.
//!
//! A chord completes when its key was pressed with exactly the configured
//! modifiers held and every one of those keys has been released again.
//! Firing on release keeps the user's physical modifiers out of the
//! synthetic Ctrl+C that follows.

use anyhow::Result;
use rdev::{EventType, Key};
use std::fmt;
use std::str::FromStr;
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

pub const DEFAULT_HOTKEY: &str = "ctrl+shift+a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Meta,
}

impl Modifier {
    fn of(key: Key) -> Option<Modifier> {
        match key {
            Key::ControlLeft | Key::ControlRight => Some(Modifier::Ctrl),
            Key::ShiftLeft | Key::ShiftRight => Some(Modifier::Shift),
            Key::Alt | Key::AltGr => Some(Modifier::Alt),
            Key::MetaLeft | Key::MetaRight => Some(Modifier::Meta),
            _ => None,
        }
    }
}

/// A modifier set plus one key, e.g. `ctrl+shift+a`
#[derive(Debug, Clone, PartialEq)]
pub struct Hotkey {
    modifiers: Vec<Modifier>,
    key: Key,
}

impl Hotkey {
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn key(&self) -> Key {
        self.key
    }
}

impl FromStr for Hotkey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((last, mods)) = parts.split_last() else {
            return Err("Empty hotkey".to_string());
        };

        let mut modifiers = Vec::new();
        for part in mods {
            let modifier = match part.to_lowercase().as_str() {
                "ctrl" | "control" => Modifier::Ctrl,
                "shift" => Modifier::Shift,
                "alt" | "option" => Modifier::Alt,
                "meta" | "super" | "cmd" | "command" | "win" => Modifier::Meta,
                other => return Err(format!("Unknown modifier '{}'", other)),
            };
            if !modifiers.contains(&modifier) {
                modifiers.push(modifier);
            }
        }
        modifiers.sort();

        let key = parse_key(last).ok_or_else(|| format!("Unknown key '{}'", last))?;
        if Modifier::of(key).is_some() {
            return Err("Hotkey must end with a non-modifier key".to_string());
        }

        Ok(Self { modifiers, key })
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{:?}+", modifier)?;
        }
        write!(f, "{:?}", self.key)
    }
}

/// Tracks key state and reports when the hotkey chord completes
#[derive(Debug)]
pub struct ChordTracker {
    hotkey: Hotkey,
    held: Vec<Key>,
    armed: bool,
}

impl ChordTracker {
    pub fn new(hotkey: Hotkey) -> Self {
        Self {
            hotkey,
            held: Vec::new(),
            armed: false,
        }
    }

    fn held_modifiers(&self) -> Vec<Modifier> {
        let mut mods: Vec<Modifier> = self.held.iter().filter_map(|k| Modifier::of(*k)).collect();
        mods.sort();
        mods.dedup();
        mods
    }

    pub fn on_press(&mut self, key: Key) {
        if !self.held.contains(&key) {
            self.held.push(key);
        }
        if key == self.hotkey.key && self.held_modifiers() == self.hotkey.modifiers {
            self.armed = true;
        }
    }

    /// Returns true when this release completes the chord
    pub fn on_release(&mut self, key: Key) -> bool {
        self.held.retain(|k| *k != key);

        let chord_down = self.held.iter().any(|k| {
            *k == self.hotkey.key
                || Modifier::of(*k).is_some_and(|m| self.hotkey.modifiers.contains(&m))
        });

        if self.armed && !chord_down {
            self.armed = false;
            return true;
        }
        false
    }
}

/// Start listening for the hotkey; one `()` is sent per completed chord
pub fn listen(hotkey: Hotkey) -> Result<mpsc::UnboundedReceiver<()>> {
    let (tx, rx) = mpsc::unbounded_channel();
    info!("⌨️ Listening for hotkey {}", hotkey);

    let mut tracker = ChordTracker::new(hotkey);
    thread::Builder::new()
        .name("hotkey-listener".to_string())
        .spawn(move || {
            let result = rdev::listen(move |event| match event.event_type {
                EventType::KeyPress(key) => tracker.on_press(key),
                EventType::KeyRelease(key) => {
                    if tracker.on_release(key) {
                        debug!("Hotkey fired");
                        let _ = tx.send(());
                    }
                }
                _ => {}
            });
            if let Err(e) = result {
                error!("❌ Global hotkey listener stopped: {:?}", e);
            }
        })?;

    Ok(rx)
}

/// Parse a key name string to an rdev Key
pub fn parse_key(name: &str) -> Option<Key> {
    match name.to_uppercase().as_str() {
        // Letters
        "A" => Some(Key::KeyA),
        "B" => Some(Key::KeyB),
        "C" => Some(Key::KeyC),
        "D" => Some(Key::KeyD),
        "E" => Some(Key::KeyE),
        "F" => Some(Key::KeyF),
        "G" => Some(Key::KeyG),
        "H" => Some(Key::KeyH),
        "I" => Some(Key::KeyI),
        "J" => Some(Key::KeyJ),
        "K" => Some(Key::KeyK),
        "L" => Some(Key::KeyL),
        "M" => Some(Key::KeyM),
        "N" => Some(Key::KeyN),
        "O" => Some(Key::KeyO),
        "P" => Some(Key::KeyP),
        "Q" => Some(Key::KeyQ),
        "R" => Some(Key::KeyR),
        "S" => Some(Key::KeyS),
        "T" => Some(Key::KeyT),
        "U" => Some(Key::KeyU),
        "V" => Some(Key::KeyV),
        "W" => Some(Key::KeyW),
        "X" => Some(Key::KeyX),
        "Y" => Some(Key::KeyY),
        "Z" => Some(Key::KeyZ),
        // Numbers
        "0" => Some(Key::Num0),
        "1" => Some(Key::Num1),
        "2" => Some(Key::Num2),
        "3" => Some(Key::Num3),
        "4" => Some(Key::Num4),
        "5" => Some(Key::Num5),
        "6" => Some(Key::Num6),
        "7" => Some(Key::Num7),
        "8" => Some(Key::Num8),
        "9" => Some(Key::Num9),
        // Function keys
        "F1" => Some(Key::F1),
        "F2" => Some(Key::F2),
        "F3" => Some(Key::F3),
        "F4" => Some(Key::F4),
        "F5" => Some(Key::F5),
        "F6" => Some(Key::F6),
        "F7" => Some(Key::F7),
        "F8" => Some(Key::F8),
        "F9" => Some(Key::F9),
        "F10" => Some(Key::F10),
        "F11" => Some(Key::F11),
        "F12" => Some(Key::F12),
        // Modifiers (only valid in modifier position)
        "CTRL" | "CONTROL" => Some(Key::ControlLeft),
        "SHIFT" => Some(Key::ShiftLeft),
        "ALT" => Some(Key::Alt),
        // Common
        "SPACE" => Some(Key::Space),
        "ENTER" | "RETURN" => Some(Key::Return),
        "TAB" => Some(Key::Tab),
        "ESC" | "ESCAPE" => Some(Key::Escape),
        "INSERT" | "INS" => Some(Key::Insert),
        "PAUSE" => Some(Key::Pause),
        _ => None,
    }
}
