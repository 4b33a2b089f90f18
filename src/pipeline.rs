//! Pipeline Orchestrator
//!
//! Owns the config store, the active completion client and the selection
//! capture. One trigger runs at a time: capture → present → complete.

use crate::config::{Config, ConfigStore, PartialConfig};
use crate::core::{Action, CompletionClient};
use crate::error::{CompletionResult, ConfigError};
use crate::selection::SelectionCapture;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// The user-facing side of the pipeline (menus, popups, notifications)
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Nothing was selected when the trigger fired
    async fn no_selection(&self);

    /// Let the user pick what to do with the selection; `None` dismisses it
    async fn choose_action(&self, selection: &str) -> Option<Action>;

    /// Show the model's answer or the classified failure
    async fn show_response(&self, action: &Action, result: &CompletionResult<String>);
}

/// What happened to a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Another cycle was already in flight
    Busy,
    NoSelection,
    Dismissed,
    Answered,
    /// Completion failed; carries the failure kind
    Failed(&'static str),
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Pipeline {
    store: ConfigStore,
    config: RwLock<Config>,
    client: RwLock<Arc<CompletionClient>>,
    capture: SelectionCapture,
    request_timeout: Duration,
    busy: AtomicBool,
}

impl Pipeline {
    /// Load config from the store and build the first client
    pub fn new(store: ConfigStore, capture: SelectionCapture) -> Self {
        Self::with_request_timeout(store, capture, crate::core::completion::REQUEST_TIMEOUT)
    }

    pub fn with_request_timeout(
        store: ConfigStore,
        capture: SelectionCapture,
        request_timeout: Duration,
    ) -> Self {
        let config = store.load();
        let client = CompletionClient::with_timeout(&config, request_timeout);
        info!(
            "🤖 Completion client initialized: {} ({})",
            config.base_url, config.model_name
        );
        Self {
            store,
            config: RwLock::new(config),
            client: RwLock::new(Arc::new(client)),
            capture,
            request_timeout,
            busy: AtomicBool::new(false),
        }
    }

    /// Config the active client was built from
    pub fn config(&self) -> Config {
        self.config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn client(&self) -> Arc<CompletionClient> {
        self.client
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub async fn capture_selection(&self) -> String {
        self.capture.capture().await
    }

    /// Wait for the clipboard restore of the last capture to finish
    pub async fn wait_for_restore(&self) {
        self.capture.wait_for_restore().await
    }

    /// Send a prompt with the client active at call time.
    ///
    /// A save or reload during the request swaps in a new client for later
    /// calls; this one finishes on the old one.
    pub async fn send_chat(&self, prompt: &str) -> CompletionResult<String> {
        let client = self.client();
        client.send_chat(prompt).await
    }

    /// Read the persisted config without touching the active client
    pub fn load_config(&self) -> Config {
        self.store.load()
    }

    /// Persist a candidate config and switch to a fresh client built from it
    pub fn save_config(&self, candidate: &PartialConfig) -> Result<Config, ConfigError> {
        let saved = self.store.save(candidate)?;
        self.install(saved.clone());
        Ok(saved)
    }

    /// Re-read the persisted config into a fresh client
    pub fn reload(&self) -> Config {
        let config = self.store.load();
        self.install(config.clone());
        config
    }

    fn install(&self, config: Config) {
        let client = Arc::new(CompletionClient::with_timeout(&config, self.request_timeout));
        info!(
            "🔄 Completion client reloaded: {} ({})",
            config.base_url, config.model_name
        );
        *self.client.write().unwrap_or_else(|e| e.into_inner()) = client;
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
    }

    /// Handle one hotkey press end to end.
    ///
    /// Triggers arriving while a cycle is in flight are ignored so captures
    /// never interleave on the shared clipboard.
    pub async fn trigger<P: Presenter + ?Sized>(&self, presenter: &P) -> TriggerOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Trigger ignored, a capture is already in flight");
            return TriggerOutcome::Busy;
        }
        let _guard = BusyGuard(&self.busy);

        let selection = self.capture_selection().await;
        if selection.trim().is_empty() {
            presenter.no_selection().await;
            return TriggerOutcome::NoSelection;
        }

        let Some(action) = presenter.choose_action(&selection).await else {
            debug!("Selection dismissed");
            return TriggerOutcome::Dismissed;
        };

        let prompt = action.build_prompt(&selection);
        let result = self.send_chat(&prompt).await;
        presenter.show_response(&action, &result).await;

        match result {
            Ok(_) => TriggerOutcome::Answered,
            Err(e) => {
                warn!("⚠️ Completion failed ({}): {}", e.kind(), e);
                TriggerOutcome::Failed(e.kind())
            }
        }
    }
}
