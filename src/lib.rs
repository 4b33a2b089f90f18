//! Highlight AI Library
//!
//! Capture the desktop text selection and ask a local LLM about it.

pub mod clipboard;
pub mod config;
pub mod core;
pub mod error;
pub mod hotkey;
pub mod input;
pub mod notify;
pub mod pipeline;
pub mod platform;
pub mod selection;
