//! Appending extracted code to the active document.
//!
//! Insertion is an explicit user action: the same block inserted twice is
//! appended twice. Nothing is saved; the document is left dirty so the user
//! decides when to write it.

use crate::document::ActiveDocument;
use crate::notify::{Level, NotificationSink};
use crate::parser::CodeBlock;
use crate::{CoreError, CoreResult};

const NO_DOCUMENT_MESSAGE: &str = "No file is currently open. Please open a file first.";
const DEFAULT_SEPARATOR: &str = "\n\n";

/// Acknowledgment of a successful insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Label of the block the code came from
    pub source: String,
    /// Length of the document after insertion, in bytes
    pub document_len: usize,
    /// Text shown to the user
    pub message: String,
}

/// Merges code blocks into an [`ActiveDocument`].
#[derive(Debug, Clone)]
pub struct InsertionController<N> {
    notifier: N,
    separator: String,
}

impl<N: NotificationSink> InsertionController<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Sets what goes between the existing content and the inserted code.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Appends `code` to `document`, naming `source` in the acknowledgment.
    ///
    /// Fails with [`CoreError::NoActiveDocument`] and leaves `document`
    /// untouched when nothing is open.
    pub fn insert<D>(&self, document: &mut D, code: &str, source: &str) -> CoreResult<Ack>
    where
        D: ActiveDocument + ?Sized,
    {
        if !document.is_open() {
            tracing::debug!("Insertion from '{}' rejected: no open document", source);
            self.notifier.notify(NO_DOCUMENT_MESSAGE, Level::Error);
            return Err(CoreError::NoActiveDocument);
        }

        let mut content = document.content();
        content.reserve(self.separator.len() + code.len());
        content.push_str(&self.separator);
        content.push_str(code);
        let document_len = content.len();

        document.set_content(content);
        document.mark_dirty();
        document.code_inserted(source);

        let message = format!("Code from {source} added to current file. Don't forget to save!");
        tracing::info!(
            "Inserted {} bytes from '{}' into '{}'",
            code.len(),
            source,
            document.name().unwrap_or_default()
        );
        self.notifier.notify(&message, Level::Success);

        Ok(Ack {
            source: source.to_string(),
            document_len,
            message,
        })
    }

    /// Inserts a parsed block, labelled by its filename.
    pub fn insert_block<D>(&self, document: &mut D, block: &CodeBlock) -> CoreResult<Ack>
    where
        D: ActiveDocument + ?Sized,
    {
        self.insert(document, &block.code, &block.filename)
    }
}
