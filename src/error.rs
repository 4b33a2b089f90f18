//! Highlight AI Error Types
//!
//! Classified failures surfaced by the config store and the completion client.

use std::time::Duration;
use thiserror::Error;

/// Failures writing the persisted configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not write config to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failures from a single chat completion exchange
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Could not connect to the inference server at {base_url}. Make sure it's running and the server is started. ({detail})")]
    Transport { base_url: String, detail: String },

    #[error("Request to the inference server timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("Inference server API error: {status}\nResponse: {body}")]
    Protocol { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid response from the inference server - no choices found")]
    EmptyResponse,

    #[error("Failed to create request for {url}: {detail}")]
    InvalidEndpoint { url: String, detail: String },
}

impl CompletionError {
    /// Short machine-friendly tag for the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::Transport { .. } => "transport",
            CompletionError::Timeout { .. } => "timeout",
            CompletionError::Protocol { .. } => "protocol",
            CompletionError::Parse(_) => "parse",
            CompletionError::EmptyResponse => "empty_response",
            CompletionError::InvalidEndpoint { .. } => "invalid_endpoint",
        }
    }

    /// HTTP status for protocol failures
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CompletionError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Internal failure inside one selection capture; never escapes `capture()`
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Synthetic copy failed: {0}")]
    Copy(String),
}

/// Result type alias for completion calls
pub type CompletionResult<T> = Result<T, CompletionError>;
