//! HTML escaping helpers.
//!
//! Every piece of text that reaches the markup goes through one of these
//! functions exactly once.

use std::borrow::Cow;

/// Escapes `&`, `<` and `>` for use in element content.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

/// Escapes text for a double-quoted attribute value.
pub fn escape_attribute(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}

/// Decodes HTML entities (`&lt;`, `&amp;`, `&#39;`, ...) back to characters.
///
/// Code is normalized through this before tokenizing, so already-escaped input
/// classifies the same way as the raw text it stands for.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(text)
}
