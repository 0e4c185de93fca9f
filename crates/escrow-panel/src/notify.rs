//! operator notifications
//!
//! every panel action ends in at least one notification. the latest is kept
//! for `/api/status`; all of them fan out to event-stream subscribers.

use parking_lot::Mutex;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;
use tracing::{error, info};

/// subscribers lagging further than this miss notifications
const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// unix seconds
    pub at: u64,
}

pub struct Notifier {
    tx: broadcast::Sender<Notification>,
    latest: Mutex<Option<Notification>>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            latest: Mutex::new(None),
        }
    }

    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) -> Notification {
        let notification = Notification {
            kind,
            message: message.into(),
            at: unix_now(),
        };

        match kind {
            NotificationKind::Error => error!("{}", notification.message),
            _ => info!("{}", notification.message),
        }

        *self.latest.lock() = Some(notification.clone());
        // no subscribers is fine
        let _ = self.tx.send(notification.clone());
        notification
    }

    pub fn info(&self, message: impl Into<String>) -> Notification {
        self.notify(NotificationKind::Info, message)
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.notify(NotificationKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.notify(NotificationKind::Error, message)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.latest.lock().clone()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
