//! Background sync and push notification hooks.
//!
//! Pass-through glue between the worker and platform services. The
//! analytics outbox and the notification surface are injected; failures are
//! logged and never propagated to the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::constants::{assets, sync};

/// Queued analytics events waiting for connectivity
#[async_trait]
pub trait AnalyticsOutbox: Send + Sync {
    async fn pending(&self) -> anyhow::Result<Vec<Value>>;
    async fn send(&self, events: &[Value]) -> anyhow::Result<()>;
    async fn clear(&self) -> anyhow::Result<()>;
}

/// Platform surface that displays notifications and opens windows
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn show(&self, notification: &Notification) -> anyhow::Result<()>;
    async fn close(&self, notification: &Notification) -> anyhow::Result<()>;
    async fn open_window(&self, url: &str) -> anyhow::Result<()>;
}

/// Action button on a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: Option<String>,
}

/// Notification built from a push payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: Option<String>,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    /// Target opened by the `open` action
    pub url: String,
    pub actions: Vec<NotificationAction>,
}

/// Push payload as delivered by the push service
#[derive(Debug, Clone, Default, Deserialize)]
struct PushPayload {
    title: Option<String>,
    body: Option<String>,
    url: Option<String>,
}

impl Notification {
    /// Build a notification from a JSON push payload
    pub fn from_push_payload(payload: &[u8]) -> serde_json::Result<Self> {
        let payload: PushPayload = serde_json::from_slice(payload)?;

        Ok(Self {
            title: payload
                .title
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| sync::DEFAULT_NOTIFICATION_TITLE.to_string()),
            body: payload.body,
            icon: assets::NOTIFICATION_ICON.to_string(),
            badge: assets::NOTIFICATION_ICON.to_string(),
            vibrate: sync::VIBRATE_PATTERN.to_vec(),
            url: payload
                .url
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| "/".to_string()),
            actions: vec![
                NotificationAction {
                    action: sync::OPEN_ACTION.to_string(),
                    title: format!("View {}", sync::DEFAULT_NOTIFICATION_TITLE),
                    icon: Some(assets::NOTIFICATION_ICON.to_string()),
                },
                NotificationAction {
                    action: sync::CLOSE_ACTION.to_string(),
                    title: "Close".to_string(),
                    icon: None,
                },
            ],
        })
    }
}

/// Outcome of a background sync event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Tag not handled by this worker
    Ignored,
    /// Nothing was queued
    Empty,
    Flushed { events: usize },
    Failed,
}

/// Flush queued analytics when connectivity returns
pub async fn sync_analytics(outbox: &dyn AnalyticsOutbox) -> SyncOutcome {
    match flush(outbox).await {
        Ok(0) => {
            debug!("Analytics sync: nothing queued");
            SyncOutcome::Empty
        }
        Ok(events) => {
            info!(events = events, "📤 Analytics sync flushed queued events");
            SyncOutcome::Flushed { events }
        }
        Err(e) => {
            error!(error = %e, "Analytics sync failed");
            SyncOutcome::Failed
        }
    }
}

async fn flush(outbox: &dyn AnalyticsOutbox) -> anyhow::Result<usize> {
    let pending = outbox.pending().await?;
    if pending.is_empty() {
        return Ok(0);
    }
    outbox.send(&pending).await?;
    outbox.clear().await?;
    Ok(pending.len())
}

/// Display a notification for a push payload. Returns the notification shown.
pub async fn handle_push(sink: &dyn NotificationSink, payload: Option<&[u8]>) -> Option<Notification> {
    let payload = payload.filter(|bytes| !bytes.is_empty())?;

    let notification = match Notification::from_push_payload(payload) {
        Ok(notification) => notification,
        Err(e) => {
            error!(error = %e, "Push payload is not valid JSON");
            return None;
        }
    };

    if let Err(e) = sink.show(&notification).await {
        error!(error = %e, title = %notification.title, "Failed to show notification");
        return None;
    }

    Some(notification)
}

/// React to a notification click. The notification is always closed;
/// returns true when a window was opened.
pub async fn handle_notification_click(
    sink: &dyn NotificationSink,
    action: &str,
    notification: &Notification,
) -> bool {
    if let Err(e) = sink.close(notification).await {
        error!(error = %e, title = %notification.title, "Failed to close notification");
    }

    if action != sync::OPEN_ACTION {
        debug!(action = action, "Notification dismissed");
        return false;
    }

    match sink.open_window(&notification.url).await {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, url = %notification.url, "Failed to open window for notification");
            false
        }
    }
}
