//! Document events.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! Instead of storing callbacks, the document publishes values on a
//! `tokio::sync::broadcast` channel. Every subscriber gets its own copy and
//! a slow subscriber cannot block the sender.

use tokio::sync::broadcast;

use crate::document::DocumentId;

/// Something that happened to the active document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// A document was loaded and is now clean
    Opened { id: DocumentId, name: String },
    /// Content changed; `dirty` is the state after the change
    Changed { id: DocumentId, dirty: bool },
    /// Code from a chat block was appended
    CodeInserted { id: DocumentId, source: String },
    /// Content was written out
    Saved { id: DocumentId },
    /// The document was closed
    Closed { id: DocumentId },
}

/// Event bus for broadcasting document events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DocumentEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: DocumentEvent) {
        // No receivers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DocumentEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Async reader that skips over lag instead of failing.
pub struct EventHandler {
    receiver: broadcast::Receiver<DocumentEvent>,
}

impl EventHandler {
    pub fn new(receiver: broadcast::Receiver<DocumentEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event; `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<DocumentEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns every event already queued, without waiting.
    pub fn drain(&mut self) -> Vec<DocumentEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                }
                Err(_) => return events,
            }
        }
    }
}
