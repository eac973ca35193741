//! User-visible notifications.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Error,
}

/// A notification as delivered to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub level: Level,
}

/// Where user-visible messages go.
pub trait NotificationSink {
    fn notify(&self, message: &str, level: Level);
}

/// Sends notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, message: &str, level: Level) {
        match level {
            Level::Info | Level::Success => tracing::info!("{}", message),
            Level::Error => tracing::error!("{}", message),
        }
    }
}

/// Keeps every notification it receives. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything received so far.
    pub fn notifications(&self) -> Vec<Notification> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications().pop()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, message: &str, level: Level) {
        let entry = Notification {
            message: message.to_string(),
            level,
        };
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for &T {
    fn notify(&self, message: &str, level: Level) {
        (**self).notify(message, level);
    }
}
