//! Markup for parsed messages.
//!
//! Every piece of message text passes through exactly one escaping call
//! before it is written: plain and inline text here, code inside the
//! highlighter. Nothing in this module re-reads markup it produced.

use codechat_syntax::{escape_attribute, escape_text};

use crate::config::RenderConfig;
use crate::message::ChatMessage;
use crate::parser::{CodeBlockSegment, MessageParser, Segment};

const TYPING_INDICATOR: &str = concat!(
    "<div class=\"typing-indicator\">",
    "<span>AI is thinking</span>",
    "<div class=\"dots\">",
    "<div class=\"dot\"></div><div class=\"dot\"></div><div class=\"dot\"></div>",
    "</div>",
    "</div>",
);

/// Renders segments to markup.
///
/// `active_document` is the name of the document currently open in the
/// editor; blocks whose filename matches it are labelled as going into the
/// current file.
pub fn render_segments(segments: &[Segment], active_document: Option<&str>) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(&escape_text(text)),
            Segment::InlineCode(code) => {
                out.push_str("<span class=\"inline-code\">");
                out.push_str(&escape_text(code));
                out.push_str("</span>");
            }
            Segment::LineBreak => out.push_str("<br>"),
            Segment::CodeBlock(block) => write_code_block(&mut out, block, active_document),
        }
    }
    out
}

fn write_code_block(out: &mut String, segment: &CodeBlockSegment, active_document: Option<&str>) {
    let filename = &segment.block.filename;
    let label = if active_document == Some(filename.as_str()) {
        "Add to Current File"
    } else {
        "Add to File"
    };

    out.push_str("<div class=\"code-block\"><div class=\"code-header\">");
    out.push_str("<span class=\"file-name\">");
    out.push_str(&escape_text(filename));
    out.push_str("</span><button class=\"add-to-file-btn\" data-file-name=\"");
    out.push_str(&escape_attribute(filename));
    out.push_str("\">");
    out.push_str(label);
    out.push_str("</button></div><pre><code>");
    out.push_str(&segment.markup);
    out.push_str("</code></pre></div>");
}

/// Renders a whole chat message, including its container and timestamp.
pub fn render_message(
    parser: &MessageParser<'_>,
    message: &ChatMessage,
    active_document: Option<&str>,
    config: &RenderConfig,
) -> String {
    let content = if message.is_pending() {
        TYPING_INDICATOR.to_string()
    } else {
        render_segments(&parser.parse(message.text()), active_document)
    };

    let mut out = format!("<div class=\"chat-message {}\">", message.role().as_str());
    out.push_str(&content);
    if config.show_timestamps {
        out.push_str("<span class=\"message-time\">");
        out.push_str(&escape_text(&message.time_label(&config.timestamp_format)));
        out.push_str("</span>");
    }
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use chrono::{Local, TimeZone};
    use codechat_syntax::{GrammarRegistry, Highlighter};
    use proptest::prelude::*;

    fn render(text: &str, active: Option<&str>) -> String {
        let registry = GrammarRegistry::with_builtin();
        let parser = MessageParser::new(Highlighter::new(&registry));
        render_segments(&parser.parse(text), active)
    }

    /// Removes the tags this module and the highlighter emit on purpose.
    fn strip_known_tags(markup: &str) -> String {
        let mut out = markup.to_string();
        for tag in [
            "<br>",
            "<pre><code>",
            "</code></pre>",
            "</div>",
            "</span>",
            "</button>",
            "<div class=\"code-block\">",
            "<div class=\"code-header\">",
            "<span class=\"file-name\">",
            "<span class=\"inline-code\">",
        ] {
            out = out.replace(tag, "");
        }
        for class in ["comment", "string", "number", "keyword", "function", "operator"] {
            out = out.replace(&format!("<span class=\"{class}\">"), "");
        }
        while let Some(start) = out.find("<button class=\"add-to-file-btn\" data-file-name=\"") {
            let Some(end) = out[start..].find("\">") else { break };
            out.replace_range(start..start + end + 2, "");
        }
        out
    }

    #[test]
    fn test_plain_text_escaped_with_breaks() {
        assert_eq!(render("a < b\nc & d", None), "a &lt; b<br>c &amp; d");
    }

    #[test]
    fn test_inline_code_markup() {
        assert_eq!(
            render("run `<x>`", None),
            "run <span class=\"inline-code\">&lt;x&gt;</span>"
        );
    }

    #[test]
    fn test_code_block_markup() {
        let html = render("```python a.py\nx = 1\n```", None);
        assert!(html.starts_with("<div class=\"code-block\"><div class=\"code-header\">"));
        assert!(html.contains("<span class=\"file-name\">a.py</span>"));
        assert!(html.contains("data-file-name=\"a.py\">Add to File</button>"));
        assert!(html.contains("<pre><code>x <span class=\"operator\">=</span> <span class=\"number\">1</span></code></pre>"));
    }

    #[test]
    fn test_active_document_label() {
        let html = render("```python a.py\nx = 1\n```", Some("a.py"));
        assert!(html.contains(">Add to Current File</button>"));
        let html = render("```python a.py\nx = 1\n```", Some("b.py"));
        assert!(html.contains(">Add to File</button>"));
    }

    #[test]
    fn test_filename_attribute_escaped() {
        let html = render("```js \"a&b\".js\nx\n```", None);
        assert!(html.contains("data-file-name=\"&quot;a&amp;b&quot;.js\""));
        assert!(html.contains("<span class=\"file-name\">\"a&amp;b\".js</span>"));
    }

    #[test]
    fn test_unterminated_fence_renders_markers() {
        let html = render("```python\nprint(1)", None);
        assert_eq!(html, "```python<br>print(1)");
    }

    #[test]
    fn test_render_message_with_timestamp() {
        let registry = GrammarRegistry::with_builtin();
        let parser = MessageParser::new(Highlighter::new(&registry));
        let ts = Local.with_ymd_and_hms(2024, 5, 6, 14, 7, 0).unwrap();
        let message = ChatMessage::with_timestamp(Role::Assistant, "hi", ts);
        let html = render_message(&parser, &message, None, &RenderConfig::default());
        assert_eq!(
            html,
            "<div class=\"chat-message assistant\">hi<span class=\"message-time\">14:07</span></div>"
        );
    }

    #[test]
    fn test_render_message_without_timestamp() {
        let registry = GrammarRegistry::with_builtin();
        let parser = MessageParser::new(Highlighter::new(&registry));
        let config = RenderConfig {
            show_timestamps: false,
            ..RenderConfig::default()
        };
        let html = render_message(&parser, &ChatMessage::user("hi"), None, &config);
        assert_eq!(html, "<div class=\"chat-message user\">hi</div>");
    }

    #[test]
    fn test_pending_message_shows_typing_indicator() {
        let registry = GrammarRegistry::with_builtin();
        let parser = MessageParser::new(Highlighter::new(&registry));
        let html = render_message(&parser, &ChatMessage::thinking(), None, &RenderConfig::default());
        assert!(html.contains("<span>AI is thinking</span>"));
        assert_eq!(html.matches("<div class=\"dot\"></div>").count(), 3);
        assert!(!html.contains("Thinking..."));
    }

    proptest! {
        #[test]
        fn rendered_messages_never_leak_markup_chars(text in "[a-z <>&`\n]{0,40}", lang in "(python|js|html|zz)") {
            let message = format!("{text}\n```{lang}\n{text}\n```\n{text}");
            let html = strip_known_tags(&render(&message, None));
            prop_assert!(!html.contains('<'));
            prop_assert!(!html.contains('>'));
            let without_entities = html
                .replace("&lt;", "")
                .replace("&gt;", "")
                .replace("&amp;", "")
                .replace("&quot;", "");
            prop_assert!(!without_entities.contains('&'));
        }
    }
}
