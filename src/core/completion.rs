//! Completion Client
//!
//! Single-turn chat against an OpenAI-compatible `/chat/completions` endpoint
//! (LM Studio, llama.cpp server, Ollama's OpenAI shim, ...).

use crate::config::Config;
use crate::error::{CompletionError, CompletionResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Hard per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const TEMPERATURE: f32 = 0.7;

/// Characters of a failing response body kept for diagnostics
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client bound to one endpoint configuration.
///
/// Rebuilt whenever the config changes; never mutated in place.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
    model_name: String,
    timeout: Duration,
}

impl CompletionClient {
    pub fn new(config: &Config) -> Self {
        Self::with_timeout(config, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(config: &Config, timeout: Duration) -> Self {
        // Local servers are reached directly, whatever HTTP_PROXY says
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_else(|e| {
                warn!("⚠️ Could not build HTTP client, using defaults: {}", e);
                reqwest::Client::new()
            });
        Self {
            http,
            base_url: config.base_url.clone(),
            model_name: config.model_name.clone(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self) -> String {
        let base = self.base_url.strip_suffix('/').unwrap_or(&self.base_url);
        format!("{}/chat/completions", base)
    }

    /// Send one prompt and return the model's reply verbatim
    pub async fn send_chat(&self, prompt: &str) -> CompletionResult<String> {
        let url = self.endpoint();
        let body = ChatRequest {
            model: &self.model_name,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            stream: false,
        };

        info!("🧠 Making request to: {} (model {})", url, self.model_name);
        debug!("Prompt length: {}", prompt.len());

        let response = self
            .http
            .post(&url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(&url, e))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| self.classify(&url, e))?;

        if !status.is_success() {
            error!("❌ HTTP Error: {} {}", status, excerpt(&body_text));
            return Err(CompletionError::Protocol {
                status: status.as_u16(),
                body: excerpt(&body_text),
            });
        }

        parse_completion(&body_text)
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> CompletionError {
        error!("❌ Request error: {}", err);
        if err.is_timeout() {
            CompletionError::Timeout {
                after: self.timeout,
            }
        } else if err.is_builder() {
            CompletionError::InvalidEndpoint {
                url: url.to_string(),
                detail: err.to_string(),
            }
        } else {
            CompletionError::Transport {
                base_url: self.base_url.clone(),
                detail: err.to_string(),
            }
        }
    }
}

/// Pull `choices[0].message.content` out of a 2xx body
fn parse_completion(body: &str) -> CompletionResult<String> {
    let parsed: ChatResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) if e.is_data() => {
            // Valid JSON in a shape we can't use
            debug!("Unusable response structure: {}", e);
            return Err(CompletionError::EmptyResponse);
        }
        Err(e) => {
            error!("❌ Parse error: {} - Body: {}", e, excerpt(body));
            return Err(CompletionError::Parse(e.to_string()));
        }
    };

    let choices = parsed.choices.unwrap_or_default();
    debug!("Response received, choices: {}", choices.len());

    choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(CompletionError::EmptyResponse)
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
