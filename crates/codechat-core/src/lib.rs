//! # Codechat Core
//!
//! Turns chat text into rendered markup and insertable code, and merges that
//! code into the document being edited.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         ChatSession                          │
//! │   submit ──► ModelProvider (async) ──► resolve ──► messages  │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ ChatMessage
//!                  ┌─────────────▼─────────────┐
//!                  │       MessageParser       │──► Highlighter
//!                  │  Text | InlineCode | Code │──► ExtensionResolver
//!                  └─────────────┬─────────────┘
//!                                │ Segments
//!            ┌───────────────────┴──────────────────┐
//!            ▼                                      ▼
//!     render (markup)                    InsertionController
//!                                                   │
//!                                       ActiveDocument (EditorDocument)
//!                                                   │
//!                                     EventBus / NotificationSink
//! ```
//!
//! ## Learning: Collaborators as Traits
//!
//! The editor and the notification area are owned by someone else. The
//! insertion logic only sees the [`ActiveDocument`] and
//! [`NotificationSink`] traits, so tests swap in an in-memory document and a
//! recording sink without touching the controller.

pub mod config;
pub mod document;
pub mod event;
pub mod insertion;
pub mod message;
pub mod notify;
pub mod parser;
pub mod provider;
pub mod render;
pub mod session;

pub use config::{Config, ConfigError, EditorConfig, ProviderConfig, ProviderKind, RenderConfig};
pub use document::{ActiveDocument, DocumentId, DocumentState, EditorDocument};
pub use event::{DocumentEvent, EventBus, EventHandler};
pub use insertion::{Ack, InsertionController};
pub use message::{ChatMessage, MessageId, Role, THINKING_TEXT};
pub use notify::{Level, Notification, NotificationSink, RecordingNotifier, TracingNotifier};
pub use parser::{CodeBlock, CodeBlockSegment, MessageParser, Segment};
pub use provider::{ClaudeProvider, ConfiguredProvider, ModelProvider, OpenAiProvider, ProviderError};
pub use render::{render_message, render_segments};
pub use session::{ChatSession, PendingReply};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No active document")]
    NoActiveDocument,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Code block {index} not found ({count} available)")]
    BlockNotFound { index: usize, count: usize },

    #[error("Document has no file path")]
    NoPath,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
