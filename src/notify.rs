//! Desktop notifications and the default presenter
//!
//! Uses zbus for async D-Bus calls to `org.freedesktop.Notifications`.
//! Without a session bus, notifications degrade to log lines.

use crate::core::Action;
use crate::error::CompletionResult;
use crate::pipeline::Presenter;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use zbus::{proxy, zvariant::Value, Connection};

const APP_NAME: &str = "Highlight AI";

/// Longest body handed to the notification daemon
const NOTIFICATION_BODY_CHARS: usize = 500;

#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: HashMap<&str, Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;
}

/// Sends desktop notifications when a session bus is available
#[derive(Debug, Clone)]
pub struct Notifier {
    proxy: Option<NotificationsProxy<'static>>,
}

impl Notifier {
    /// Connect to the notification service, falling back to logging
    pub async fn connect() -> Self {
        let proxy = match Connection::session().await {
            Ok(connection) => match NotificationsProxy::new(&connection).await {
                Ok(proxy) => {
                    info!("🔔 Connected to desktop notifications");
                    Some(proxy)
                }
                Err(e) => {
                    warn!("⚠️ Notification service unavailable: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("⚠️ No D-Bus session bus, notifications go to the log: {}", e);
                None
            }
        };
        Self { proxy }
    }

    /// Notifier that only logs
    pub fn disabled() -> Self {
        Self { proxy: None }
    }

    pub async fn notify(&self, summary: &str, body: &str, expire_ms: i32) {
        let Some(proxy) = &self.proxy else {
            info!("🔔 {}: {}", summary, body);
            return;
        };

        let body = truncate_body(body);
        if let Err(e) = proxy
            .notify(APP_NAME, 0, "", summary, &body, &[], HashMap::new(), expire_ms)
            .await
        {
            warn!("⚠️ Failed to send notification: {}", e);
        }
    }
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(NOTIFICATION_BODY_CHARS) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}

/// Presenter for the hotkey daemon: one fixed action, answers on stdout and
/// as a desktop notification
#[derive(Debug, Clone)]
pub struct NotifyPresenter {
    notifier: Notifier,
    action: Action,
}

impl NotifyPresenter {
    pub fn new(notifier: Notifier, action: Action) -> Self {
        Self { notifier, action }
    }
}

#[async_trait]
impl Presenter for NotifyPresenter {
    async fn no_selection(&self) {
        info!("No text selected - make sure you have text selected before pressing the hotkey");
        self.notifier
            .notify(
                "No text selected",
                "Select text first, then press the hotkey",
                2000,
            )
            .await;
    }

    async fn choose_action(&self, selection: &str) -> Option<Action> {
        debug!("Presenting {} chars for '{}'", selection.len(), self.action);
        Some(self.action.clone())
    }

    async fn show_response(&self, action: &Action, result: &CompletionResult<String>) {
        match result {
            Ok(text) => {
                println!("{}", text);
                self.notifier.notify(action.label(), text, -1).await;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                self.notifier.notify("Highlight AI error", &e.to_string(), -1).await;
            }
        }
    }
}
