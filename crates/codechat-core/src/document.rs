//! The document being edited, as seen by the insertion logic.
//!
//! ## Learning: Newtypes and State Enums
//!
//! `DocumentId` wraps a `Uuid` so it cannot be confused with any other
//! string or number. `DocumentState` makes the lifecycle explicit:
//!
//! ```text
//! Closed ──load/open_file──► Clean ⇄ Dirty ──close──► Closed
//!                             (edit / save)
//! ```

use ropey::Rope;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::event::{DocumentEvent, EventBus};
use crate::{CoreError, CoreResult};

/// Unique identifier for one opening of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of the active document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentState {
    #[default]
    Closed,
    Clean,
    Dirty,
}

/// What the insertion logic needs from the editor.
pub trait ActiveDocument {
    fn is_open(&self) -> bool;

    /// Display name, `None` when closed.
    fn name(&self) -> Option<&str>;

    fn content(&self) -> String;

    fn set_content(&mut self, content: String);

    /// Flags unsaved changes regardless of content.
    fn mark_dirty(&mut self);

    /// Called after code from `source` was appended.
    fn code_inserted(&mut self, _source: &str) {}
}

/// A single editable document with a rope buffer.
#[derive(Debug, Default)]
pub struct EditorDocument {
    id: DocumentId,
    name: Option<String>,
    path: Option<PathBuf>,
    text: Rope,
    /// Content as of the last load or save
    original: String,
    state: DocumentState,
    events: Option<EventBus>,
}

impl EditorDocument {
    /// Creates a closed document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a closed document that publishes its changes on `events`.
    pub fn with_events(events: EventBus) -> Self {
        Self {
            events: Some(events),
            ..Self::default()
        }
    }

    /// Opens an in-memory document with no backing file.
    pub fn load(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.open(name.into(), None, content.into());
    }

    /// Opens a document from disk.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::FileNotFound(path.display().to_string()),
            _ => CoreError::Io(e),
        })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Unknown")
            .to_string();
        self.open(name, Some(path.to_path_buf()), content);
        Ok(())
    }

    fn open(&mut self, name: String, path: Option<PathBuf>, content: String) {
        self.id = DocumentId::new();
        self.text = Rope::from_str(&content);
        self.original = content;
        self.path = path;
        self.state = DocumentState::Clean;
        tracing::info!("Opened document '{}'", name);
        self.emit(DocumentEvent::Opened {
            id: self.id,
            name: name.clone(),
        });
        self.name = Some(name);
    }

    /// Closes the document, discarding unsaved changes.
    pub fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        if self.is_modified() {
            tracing::warn!("Closing '{}' with unsaved changes", self.name.as_deref().unwrap_or(""));
        }
        self.emit(DocumentEvent::Closed { id: self.id });
        self.name = None;
        self.path = None;
        self.text = Rope::new();
        self.original.clear();
        self.state = DocumentState::Closed;
    }

    /// Replaces the content. The document is dirty iff the new content
    /// differs from what was last loaded or saved.
    pub fn edit(&mut self, content: impl Into<String>) -> CoreResult<()> {
        if !self.is_open() {
            return Err(CoreError::NoActiveDocument);
        }
        let content = content.into();
        self.state = if content == self.original {
            DocumentState::Clean
        } else {
            DocumentState::Dirty
        };
        self.text = Rope::from_str(&content);
        self.emit(DocumentEvent::Changed {
            id: self.id,
            dirty: self.is_modified(),
        });
        Ok(())
    }

    /// Writes the content to the document's own path.
    pub fn save(&mut self) -> CoreResult<()> {
        let path = self.path.clone().ok_or(CoreError::NoPath)?;
        self.save_to(path)
    }

    /// Writes the content to `path`, which becomes the document's path.
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        if !self.is_open() {
            return Err(CoreError::NoActiveDocument);
        }
        let path = path.as_ref();
        let content = self.text.to_string();
        std::fs::write(path, &content)?;
        tracing::info!("Saved {} bytes to {}", content.len(), path.display());
        self.original = content;
        self.path = Some(path.to_path_buf());
        self.state = DocumentState::Clean;
        self.emit(DocumentEvent::Saved { id: self.id });
        Ok(())
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn is_modified(&self) -> bool {
        self.state == DocumentState::Dirty
    }

    /// Content as of the last load or save.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    fn emit(&self, event: DocumentEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}

impl ActiveDocument for EditorDocument {
    fn is_open(&self) -> bool {
        self.state != DocumentState::Closed
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn content(&self) -> String {
        self.text.to_string()
    }

    fn set_content(&mut self, content: String) {
        if let Err(e) = self.edit(content) {
            tracing::debug!("Ignoring content update: {}", e);
        }
    }

    fn mark_dirty(&mut self) {
        if self.is_open() {
            self.state = DocumentState::Dirty;
        }
    }

    fn code_inserted(&mut self, source: &str) {
        self.emit(DocumentEvent::CodeInserted {
            id: self.id,
            source: source.to_string(),
        });
    }
}
