//! # Codechat Syntax
//!
//! Lexical classification of code embedded in chat messages.
//!
//! ## Pipeline
//!
//! ```text
//! code text ──decode entities──► tokenize (Grammar) ──► [TokenSpan] ──render──► markup
//!                                     │
//!                unknown language ────┴──► escape-only markup
//! ```
//!
//! Highlighting is lexical only. There is no parse tree: a [`Grammar`] is an
//! ordered list of [`Rule`]s and the tokenizer makes a single left-to-right
//! pass, so every byte of input lands in exactly one span and is escaped
//! exactly once.
//!
//! ## Learning: Registries Instead of Globals
//!
//! Grammars live in a [`GrammarRegistry`] value that callers own and pass by
//! reference. Adding a language means registering another `Grammar`; the
//! dispatch code in [`Highlighter`] never changes.

mod escape;
mod extension;
mod grammar;
mod highlighter;
mod languages;

pub use escape::{decode_entities, escape_attribute, escape_text};
pub use extension::{DEFAULT_EXTENSION, ExtensionResolver};
pub use grammar::{Grammar, GrammarRegistry, Matcher, Rule, TokenCategory, WordSet};
pub use highlighter::{DEFAULT_MAX_HIGHLIGHT_BYTES, Highlighter, Token, TokenSpan, escape_only, tokenize};

/// Errors that can occur while registering or looking up grammars.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Grammar name must not be empty")]
    EmptyLanguageName,
}
