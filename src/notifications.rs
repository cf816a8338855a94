use crate::models::{Notification, Severity};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// How long a notification stays visible before it removes itself.
pub const NOTIFICATION_DISPLAY_DURATION: Duration = Duration::from_secs(5);

/// Ephemeral, self-draining notification list (newest first).
///
/// Cloning yields another handle onto the same queue.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    items: Mutex<Vec<Notification>>,
    display_for: Duration,
    updates: watch::Sender<Vec<Notification>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::with_display_duration(NOTIFICATION_DISPLAY_DURATION)
    }

    pub fn with_display_duration(display_for: Duration) -> Self {
        let (updates, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(QueueInner {
                items: Mutex::new(Vec::new()),
                display_for,
                updates,
            }),
        }
    }

    /// Add a notification at the front and schedule its removal.
    pub fn push(&self, message: impl Into<String>, severity: Severity) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            created_at: Utc::now(),
        };
        let id = notification.id;
        tracing::debug!(%id, %severity, message = %notification.message, "notification queued");

        self.mutate(|items| items.insert(0, notification));

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let queue = self.clone();
                let display_for = self.inner.display_for;
                handle.spawn(async move {
                    tokio::time::sleep(display_for).await;
                    queue.remove(id);
                });
            }
            Err(_) => {
                tracing::warn!(%id, "no async runtime; notification will not expire on its own");
            }
        }

        id
    }

    /// Remove a notification before its timer fires. Returns whether it was present.
    pub fn dismiss(&self, id: Uuid) -> bool {
        self.remove(id)
    }

    pub fn list(&self) -> Vec<Notification> {
        self.inner
            .items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receive the full list every time it changes.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.updates.subscribe()
    }

    // Removal is keyed by id; a second removal for the same id finds nothing.
    fn remove(&self, id: Uuid) -> bool {
        let mut removed = false;
        self.mutate(|items| {
            let before = items.len();
            items.retain(|n| n.id != id);
            removed = items.len() != before;
        });
        if removed {
            tracing::debug!(%id, "notification removed");
        }
        removed
    }

    fn mutate(&self, f: impl FnOnce(&mut Vec<Notification>)) {
        let snapshot = match self.inner.items.lock() {
            Ok(mut items) => {
                f(&mut items);
                items.clone()
            }
            Err(_) => return,
        };
        self.inner.updates.send_replace(snapshot);
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}
