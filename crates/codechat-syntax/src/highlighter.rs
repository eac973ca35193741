//! Single-pass tokenizer and markup renderer.
//!
//! The tokenizer walks the code once, left to right. At each position the
//! grammar's rules are tried in precedence order and the first match claims
//! the bytes; unclaimed identifiers and characters accumulate into plain
//! spans. The result is a flat, ordered list of non-overlapping spans that
//! covers the input exactly, so no text is ever wrapped twice.

use std::ops::Range;

use crate::escape::{decode_entities, escape_text};
use crate::grammar::{Grammar, GrammarRegistry, TokenCategory};

/// Code larger than this is rendered escape-only.
pub const DEFAULT_MAX_HIGHLIGHT_BYTES: usize = 512 * 1024;

/// A classified byte range of the (entity-decoded) source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub category: TokenCategory,
    pub range: Range<usize>,
}

/// A classified run of code with its text already escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpan {
    pub category: TokenCategory,
    pub text: String,
}

impl TokenSpan {
    /// Appends this span's markup to `out`.
    pub fn write_markup(&self, out: &mut String) {
        match self.category.css_class() {
            Some(class) => {
                out.push_str("<span class=\"");
                out.push_str(class);
                out.push_str("\">");
                out.push_str(&self.text);
                out.push_str("</span>");
            }
            None => out.push_str(&self.text),
        }
    }
}

/// Splits `source` into tokens according to `grammar`.
///
/// Adjacent unclassified text is merged into one [`TokenCategory::Plain`]
/// token. The ranges are contiguous and together cover `source`.
pub fn tokenize(source: &str, grammar: &Grammar) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut plain_start: Option<usize> = None;
    let mut i = 0;

    while i < source.len() {
        let word_end = grammar.word_end(source, i);

        if let Some((end, category)) = grammar.match_at(source, i, word_end) {
            if let Some(start) = plain_start.take() {
                tokens.push(Token {
                    category: TokenCategory::Plain,
                    range: start..i,
                });
            }
            tokens.push(Token {
                category,
                range: i..end,
            });
            i = end;
            continue;
        }

        // Unclassified: swallow whole identifiers so later rules never
        // match inside them.
        let end = word_end.unwrap_or_else(|| {
            i + source[i..].chars().next().map(char::len_utf8).unwrap_or(1)
        });
        plain_start.get_or_insert(i);
        i = end;
    }

    if let Some(start) = plain_start {
        tokens.push(Token {
            category: TokenCategory::Plain,
            range: start..source.len(),
        });
    }

    tokens
}

/// Renders code without any classification, only escaping it.
///
/// Entities are decoded first, so applying this to its own output returns
/// the output unchanged.
pub fn escape_only(code: &str) -> String {
    escape_text(&decode_entities(code)).into_owned()
}

/// Applies registered grammars to code text.
///
/// Borrows the registry; build one [`GrammarRegistry`] at startup and hand
/// out highlighters as needed.
#[derive(Debug, Clone, Copy)]
pub struct Highlighter<'a> {
    registry: &'a GrammarRegistry,
    max_bytes: usize,
}

impl<'a> Highlighter<'a> {
    pub fn new(registry: &'a GrammarRegistry) -> Self {
        Self {
            registry,
            max_bytes: DEFAULT_MAX_HIGHLIGHT_BYTES,
        }
    }

    /// Sets the size above which code is rendered escape-only.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn registry(&self) -> &'a GrammarRegistry {
        self.registry
    }

    /// Classifies `code` for `language`, returning escaped spans.
    ///
    /// Unknown languages and oversized input yield a single plain span.
    pub fn tokenize(&self, code: &str, language: &str) -> Vec<TokenSpan> {
        let source = decode_entities(code);
        if source.is_empty() {
            return Vec::new();
        }

        let grammar = match self.grammar_for(&source, language) {
            Some(grammar) => grammar,
            None => {
                return vec![TokenSpan {
                    category: TokenCategory::Plain,
                    text: escape_text(&source).into_owned(),
                }];
            }
        };

        tokenize(&source, grammar)
            .into_iter()
            .map(|token| TokenSpan {
                category: token.category,
                text: escape_text(&source[token.range]).into_owned(),
            })
            .collect()
    }

    /// Highlights `code` for `language` and returns the markup.
    pub fn highlight(&self, code: &str, language: &str) -> String {
        let spans = self.tokenize(code, language);
        let mut out = String::with_capacity(code.len() + spans.len() * 24);
        for span in &spans {
            span.write_markup(&mut out);
        }
        out
    }

    fn grammar_for(&self, source: &str, language: &str) -> Option<&'a Grammar> {
        if source.len() > self.max_bytes {
            tracing::debug!(
                "Code block of {} bytes exceeds highlight limit, escaping only",
                source.len()
            );
            return None;
        }
        match self.registry.lookup(language) {
            Ok(grammar) => Some(grammar),
            Err(err) => {
                tracing::debug!("{}; falling back to escape-only rendering", err);
                None
            }
        }
    }
}
