//! Splitting chat text into plain text, inline code, and fenced code blocks.
//!
//! ## Fence grammar
//!
//! ````text
//! ```<lang>[ <filename>]\n
//! <body, verbatim>
//! ```
//! ````
//!
//! - `lang` is the run of word characters (plus `+`, `#`, `-`) directly after
//!   the opening marker; it defaults to `text`.
//! - `filename` is the first whitespace-separated token after the language;
//!   it defaults to `<lang>.<extension>`.
//! - The body is every byte between the end of the opening line and the next
//!   marker. The single line break that precedes the closing marker belongs
//!   to the fence, not the body.
//! - An opening marker with no closing marker is not a code block. Everything
//!   from that marker onward is kept as literal text.

use codechat_syntax::{ExtensionResolver, Highlighter};
use serde::{Deserialize, Serialize};

const FENCE: &str = "```";
const DEFAULT_LANGUAGE: &str = "text";

/// A code unit extracted from a message, ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Language tag as written, or `text` when absent.
    pub language: String,
    /// Filename hint from the fence line, if any.
    pub declared_filename: Option<String>,
    /// Exact bytes between the fences.
    pub code: String,
    pub extension: String,
    /// `declared_filename`, or `<language>.<extension>`.
    pub filename: String,
}

impl CodeBlock {
    fn new(language: Option<&str>, declared_filename: Option<&str>, code: &str) -> Self {
        let language = language.unwrap_or(DEFAULT_LANGUAGE).to_string();
        let extension = ExtensionResolver::resolve(&language).to_string();
        let filename = match declared_filename {
            Some(name) => name.to_string(),
            None => format!("{language}.{extension}"),
        };
        Self {
            language,
            declared_filename: declared_filename.map(str::to_string),
            code: code.to_string(),
            extension,
            filename,
        }
    }
}

/// A code block together with its highlighted markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockSegment {
    pub block: CodeBlock,
    pub markup: String,
}

/// One piece of a parsed message, in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Raw (unescaped) text without line breaks.
    Text(String),
    /// Contents of a single-backtick span.
    InlineCode(String),
    LineBreak,
    CodeBlock(CodeBlockSegment),
}

impl Segment {
    pub fn as_code_block(&self) -> Option<&CodeBlock> {
        match self {
            Segment::CodeBlock(segment) => Some(&segment.block),
            _ => None,
        }
    }
}

/// Parses chat text into [`Segment`]s.
#[derive(Debug, Clone, Copy)]
pub struct MessageParser<'a> {
    highlighter: Highlighter<'a>,
}

impl<'a> MessageParser<'a> {
    pub fn new(highlighter: Highlighter<'a>) -> Self {
        Self { highlighter }
    }

    pub fn highlighter(&self) -> Highlighter<'a> {
        self.highlighter
    }

    /// Splits `text` into ordered segments.
    pub fn parse(&self, text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut plain_start = 0;
        let mut search_from = 0;

        while let Some(offset) = text[search_from..].find(FENCE) {
            let open = search_from + offset;
            let info_start = open + FENCE.len();

            let Some(line_len) = text[info_start..].find('\n') else {
                tracing::debug!("Unterminated fence at byte {}: no line break after marker", open);
                return self.finish_unterminated(segments, text, plain_start, open);
            };
            let info = &text[info_start..info_start + line_len];
            let body_start = info_start + line_len + 1;

            if info.contains(FENCE) {
                // Markers sharing one line never open a block.
                search_from = body_start;
                continue;
            }

            let Some(body_len) = text[body_start..].find(FENCE) else {
                tracing::debug!("Unterminated fence at byte {}: no closing marker", open);
                return self.finish_unterminated(segments, text, plain_start, open);
            };
            let close = body_start + body_len;

            push_prose(&mut segments, &text[plain_start..open]);

            let (language, filename) = parse_info(info);
            let code = strip_closing_break(&text[body_start..close]);
            let block = CodeBlock::new(language, filename, code);
            let markup = self.highlighter.highlight(&block.code, &block.language);
            segments.push(Segment::CodeBlock(CodeBlockSegment { block, markup }));

            plain_start = close + FENCE.len();
            search_from = plain_start;
        }

        push_prose(&mut segments, &text[plain_start..]);
        segments
    }

    /// Returns only the code blocks of `text`, in order.
    pub fn code_blocks(&self, text: &str) -> Vec<CodeBlock> {
        self.parse(text)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::CodeBlock(segment) => Some(segment.block),
                _ => None,
            })
            .collect()
    }

    fn finish_unterminated(
        &self,
        mut segments: Vec<Segment>,
        text: &str,
        plain_start: usize,
        open: usize,
    ) -> Vec<Segment> {
        push_prose(&mut segments, &text[plain_start..open]);
        push_lines(&mut segments, &text[open..]);
        segments
    }
}

/// Splits the opening line into language tag and filename hint.
fn parse_info(info: &str) -> (Option<&str>, Option<&str>) {
    let info = info.strip_suffix('\r').unwrap_or(info);
    let lang_len: usize = info
        .chars()
        .take_while(|&c| c.is_alphanumeric() || matches!(c, '_' | '+' | '#' | '-'))
        .map(char::len_utf8)
        .sum();
    let language = (lang_len > 0).then(|| &info[..lang_len]);
    let filename = info[lang_len..].split_whitespace().next();
    (language, filename)
}

fn strip_closing_break(body: &str) -> &str {
    body.strip_suffix("\r\n")
        .or_else(|| body.strip_suffix('\n'))
        .unwrap_or(body)
}

/// Text outside code blocks: inline code spans and line breaks.
fn push_prose(segments: &mut Vec<Segment>, chunk: &str) {
    let mut text_start = 0;
    let mut i = 0;

    while let Some(offset) = chunk[i..].find('`') {
        let open = i + offset;
        let content_start = open + 1;
        match chunk[content_start..].find(['`', '\n']) {
            Some(len) if len > 0 && chunk[content_start + len..].starts_with('`') => {
                push_lines(segments, &chunk[text_start..open]);
                segments.push(Segment::InlineCode(
                    chunk[content_start..content_start + len].to_string(),
                ));
                i = content_start + len + 1;
                text_start = i;
            }
            _ => i = content_start,
        }
    }

    push_lines(segments, &chunk[text_start..]);
}

/// Literal text, with each line break turned into a [`Segment::LineBreak`].
fn push_lines(segments: &mut Vec<Segment>, chunk: &str) {
    let mut lines = chunk.split('\n').peekable();
    while let Some(line) = lines.next() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if !line.is_empty() {
            match segments.last_mut() {
                Some(Segment::Text(prev)) => prev.push_str(line),
                _ => segments.push(Segment::Text(line.to_string())),
            }
        }
        if lines.peek().is_some() {
            segments.push(Segment::LineBreak);
        }
    }
}
