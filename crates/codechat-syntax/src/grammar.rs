//! Grammars: ordered lexical rules per language, and the registry that holds them.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::SyntaxError;

/// Lexical category of a token span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    Comment,
    String,
    Number,
    Keyword,
    Builtin,
    Operator,
    Plain,
}

impl TokenCategory {
    /// Returns the CSS class used in markup, or `None` for unwrapped text.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            TokenCategory::Comment => Some("comment"),
            TokenCategory::String => Some("string"),
            TokenCategory::Number => Some("number"),
            TokenCategory::Keyword => Some("keyword"),
            TokenCategory::Builtin => Some("function"),
            TokenCategory::Operator => Some("operator"),
            TokenCategory::Plain => None,
        }
    }

    /// Default precedence of rules producing this category (lower runs first).
    fn default_priority(self) -> u8 {
        match self {
            TokenCategory::Comment => 2,
            TokenCategory::String => 3,
            TokenCategory::Number => 4,
            TokenCategory::Keyword => 5,
            TokenCategory::Builtin => 6,
            TokenCategory::Operator => 7,
            TokenCategory::Plain => u8::MAX,
        }
    }
}

/// A set of exact-match words (keywords or builtin identifiers).
#[derive(Debug, Clone)]
pub struct WordSet {
    words: HashSet<String>,
    case_insensitive: bool,
}

impl WordSet {
    fn new(words: &[&str], case_insensitive: bool) -> Self {
        let words = words
            .iter()
            .map(|w| {
                if case_insensitive {
                    w.to_ascii_lowercase()
                } else {
                    (*w).to_string()
                }
            })
            .collect();
        Self {
            words,
            case_insensitive,
        }
    }

    /// Returns true if `word` is a member.
    pub fn contains(&self, word: &str) -> bool {
        if self.case_insensitive {
            self.words.contains(word.to_ascii_lowercase().as_str())
        } else {
            self.words.contains(word)
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// How a rule recognizes its token at a given position.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// `open ... close`, may span lines; unterminated runs to end of input.
    BlockComment {
        open: &'static str,
        close: &'static str,
    },
    /// `prefix ...` up to (not including) the line break.
    LineComment { prefix: &'static str },
    /// A literal opened and closed by `delimiter`, with backslash escapes.
    Quoted {
        delimiter: &'static str,
        multiline: bool,
    },
    /// A single-quoted character such as `'x'`, `'\n'` or `'\u{1F600}'`.
    /// Anything else starting with `'` (a lifetime, say) is left alone.
    CharLiteral,
    /// Decimal, hex, octal and binary literals; `suffixes` also takes a
    /// trailing alphanumeric suffix such as `u32`, `L` or `px`.
    Number { suffixes: bool },
    /// Whole identifiers found in the set.
    Words(WordSet),
    /// A run of the given operator/punctuation characters.
    Operators { chars: &'static str },
}

/// One lexical rule of a grammar.
#[derive(Debug, Clone)]
pub struct Rule {
    pub category: TokenCategory,
    pub matcher: Matcher,
    pub priority: u8,
}

impl Rule {
    pub fn new(category: TokenCategory, matcher: Matcher) -> Self {
        Self {
            category,
            matcher,
            priority: category.default_priority(),
        }
    }

    pub fn block_comment(open: &'static str, close: &'static str) -> Self {
        Self {
            priority: 1,
            ..Self::new(TokenCategory::Comment, Matcher::BlockComment { open, close })
        }
    }

    pub fn line_comment(prefix: &'static str) -> Self {
        Self::new(TokenCategory::Comment, Matcher::LineComment { prefix })
    }

    pub fn string(delimiter: &'static str) -> Self {
        Self::new(
            TokenCategory::String,
            Matcher::Quoted {
                delimiter,
                multiline: false,
            },
        )
    }

    pub fn char_literal() -> Self {
        Self::new(TokenCategory::String, Matcher::CharLiteral)
    }

    pub fn multiline_string(delimiter: &'static str) -> Self {
        Self::new(
            TokenCategory::String,
            Matcher::Quoted {
                delimiter,
                multiline: true,
            },
        )
    }

    pub fn number() -> Self {
        Self::new(TokenCategory::Number, Matcher::Number { suffixes: false })
    }

    pub fn number_with_suffixes() -> Self {
        Self::new(TokenCategory::Number, Matcher::Number { suffixes: true })
    }

    pub fn keywords(words: &[&str]) -> Self {
        Self::new(TokenCategory::Keyword, Matcher::Words(WordSet::new(words, false)))
    }

    pub fn keywords_ignore_case(words: &[&str]) -> Self {
        Self::new(TokenCategory::Keyword, Matcher::Words(WordSet::new(words, true)))
    }

    pub fn builtins(words: &[&str]) -> Self {
        Self::new(TokenCategory::Builtin, Matcher::Words(WordSet::new(words, false)))
    }

    pub fn builtins_ignore_case(words: &[&str]) -> Self {
        Self::new(TokenCategory::Builtin, Matcher::Words(WordSet::new(words, true)))
    }

    pub fn operators(chars: &'static str) -> Self {
        Self::new(TokenCategory::Operator, Matcher::Operators { chars })
    }

    /// Overrides the precedence of this rule.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Tries to match at byte offset `pos`. `word_end` is the end of the
    /// identifier starting at `pos`, if one starts there.
    pub(crate) fn match_at(&self, src: &str, pos: usize, word_end: Option<usize>) -> Option<usize> {
        let rest = &src[pos..];
        match &self.matcher {
            Matcher::BlockComment { open, close } => {
                if !rest.starts_with(open) {
                    return None;
                }
                let body = pos + open.len();
                Some(match src[body..].find(close) {
                    Some(offset) => body + offset + close.len(),
                    None => src.len(),
                })
            }
            Matcher::LineComment { prefix } => {
                if !rest.starts_with(prefix) {
                    return None;
                }
                Some(match rest.find('\n') {
                    Some(offset) => pos + offset,
                    None => src.len(),
                })
            }
            Matcher::Quoted {
                delimiter,
                multiline,
            } => rest
                .starts_with(delimiter)
                .then(|| scan_quoted(src, pos, delimiter, *multiline)),
            Matcher::CharLiteral => scan_char_literal(src, pos),
            Matcher::Number { suffixes } => scan_number(src, pos, *suffixes),
            Matcher::Words(set) => {
                let end = word_end?;
                set.contains(&src[pos..end]).then_some(end)
            }
            Matcher::Operators { chars } => {
                let len: usize = rest
                    .chars()
                    .take_while(|c| chars.contains(*c))
                    .map(char::len_utf8)
                    .sum();
                (len > 0).then_some(pos + len)
            }
        }
    }
}

/// Scans a quoted literal starting at `pos` (which holds the delimiter).
fn scan_quoted(src: &str, pos: usize, delimiter: &str, multiline: bool) -> usize {
    let mut i = pos + delimiter.len();
    while i < src.len() {
        let rest = &src[i..];
        if rest.starts_with(delimiter) {
            return i + delimiter.len();
        }
        let Some(c) = rest.chars().next() else {
            break;
        };
        if c == '\\' {
            i += 1;
            // The escaped character belongs to the literal, even a quote.
            if let Some(next) = src[i..].chars().next() {
                if next == '\n' && !multiline {
                    i += 1;
                    continue;
                }
                i += next.len_utf8();
            }
            continue;
        }
        if c == '\n' && !multiline {
            // Unterminated on this line; stop before the break.
            return i;
        }
        i += c.len_utf8();
    }
    src.len()
}

/// Scans a character literal starting at `pos`, or `None` if the quote
/// does not open one.
fn scan_char_literal(src: &str, pos: usize) -> Option<usize> {
    let mut chars = src[pos..].char_indices();
    if chars.next()? != (0, '\'') {
        return None;
    }
    let (_, c) = chars.next()?;
    match c {
        '\\' => {
            let (_, escaped) = chars.next()?;
            if escaped == 'u' && src[pos..].get(3..4) == Some("{") {
                let (_, close) = chars.find(|&(_, c)| matches!(c, '}' | '\'' | '\n'))?;
                if close != '}' {
                    return None;
                }
            }
        }
        '\'' | '\n' => return None,
        _ => {}
    }
    match chars.next()? {
        (offset, '\'') => Some(pos + offset + 1),
        _ => None,
    }
}

/// Scans a numeric literal starting at `pos`.
fn scan_number(src: &str, pos: usize, suffixes: bool) -> Option<usize> {
    let bytes = src.as_bytes();
    let len = bytes.len();
    let first = bytes[pos];
    let starts_fraction = first == b'.' && pos + 1 < len && bytes[pos + 1].is_ascii_digit();
    if !first.is_ascii_digit() && !starts_fraction {
        return None;
    }

    let mut i = pos;
    let radix_digits: Option<fn(u8) -> bool> = if first == b'0' && pos + 1 < len {
        match bytes[pos + 1] {
            b'x' | b'X' => Some(is_hex_digit),
            b'o' | b'O' => Some(is_octal_digit),
            b'b' | b'B' => Some(is_binary_digit),
            _ => None,
        }
    } else {
        None
    };

    if let Some(is_digit) = radix_digits {
        i += 2;
        while i < len && (is_digit(bytes[i]) || bytes[i] == b'_') {
            i += 1;
        }
    } else {
        let mut seen_dot = false;
        while i < len {
            let b = bytes[i];
            if b.is_ascii_digit() || b == b'_' {
                i += 1;
            } else if b == b'.' && !seen_dot && i + 1 < len && bytes[i + 1].is_ascii_digit() {
                seen_dot = true;
                i += 1;
            } else if (b == b'e' || b == b'E')
                && i + 1 < len
                && (bytes[i + 1].is_ascii_digit()
                    || ((bytes[i + 1] == b'+' || bytes[i + 1] == b'-')
                        && i + 2 < len
                        && bytes[i + 2].is_ascii_digit()))
            {
                i += 2;
            } else {
                break;
            }
        }
    }

    if suffixes {
        while i < len && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'%') {
            i += 1;
        }
    }
    Some(i)
}

fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

fn is_octal_digit(b: u8) -> bool {
    (b'0'..=b'7').contains(&b)
}

fn is_binary_digit(b: u8) -> bool {
    b == b'0' || b == b'1'
}

/// The ordered rule set for one language.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    aliases: Vec<String>,
    rules: Vec<Rule>,
    word_start: &'static str,
    word_continue: &'static str,
}

impl Grammar {
    /// Creates an empty grammar. Identifiers are `[A-Za-z_][A-Za-z0-9_]*`
    /// plus any extra characters configured with [`Grammar::word_chars`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            rules: Vec::new(),
            word_start: "",
            word_continue: "",
        }
    }

    /// Adds an alternative tag this grammar answers to.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Extra identifier characters: `start` may begin a word, `cont` may
    /// appear after the first character.
    pub fn word_chars(mut self, start: &'static str, cont: &'static str) -> Self {
        self.word_start = start;
        self.word_continue = cont;
        self
    }

    /// Adds a rule, keeping rules ordered by priority. Rules of equal
    /// priority keep insertion order.
    pub fn rule(mut self, rule: Rule) -> Self {
        let idx = self.rules.partition_point(|r| r.priority <= rule.priority);
        self.rules.insert(idx, rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    fn is_word_start(&self, c: char) -> bool {
        c.is_alphabetic() || c == '_' || self.word_start.contains(c)
    }

    fn is_word_continue(&self, c: char) -> bool {
        c.is_alphanumeric() || c == '_' || self.word_start.contains(c) || self.word_continue.contains(c)
    }

    /// Returns the end of the identifier starting at `pos`, if any.
    pub(crate) fn word_end(&self, src: &str, pos: usize) -> Option<usize> {
        let mut chars = src[pos..].char_indices();
        let (_, first) = chars.next()?;
        if !self.is_word_start(first) {
            return None;
        }
        let end = chars
            .find(|(_, c)| !self.is_word_continue(*c))
            .map(|(offset, _)| pos + offset)
            .unwrap_or(src.len());
        Some(end)
    }

    /// Finds the first rule (in precedence order) matching at `pos`.
    pub(crate) fn match_at(&self, src: &str, pos: usize, word_end: Option<usize>) -> Option<(usize, TokenCategory)> {
        self.rules.iter().find_map(|rule| {
            rule.match_at(src, pos, word_end)
                .filter(|&end| end > pos)
                .map(|end| (end, rule.category))
        })
    }
}

/// Grammars keyed by language tag (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct GrammarRegistry {
    grammars: Vec<Grammar>,
    by_tag: HashMap<String, usize>,
}

impl GrammarRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in grammar.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for grammar in crate::languages::builtin() {
            // Built-in names are never empty.
            let _ = registry.register(grammar);
        }
        registry
    }

    /// Registers a grammar under its name and aliases. A later registration
    /// for the same tag replaces the earlier one.
    pub fn register(&mut self, grammar: Grammar) -> Result<(), SyntaxError> {
        if grammar.name.trim().is_empty() {
            return Err(SyntaxError::EmptyLanguageName);
        }
        let idx = self.grammars.len();
        let tags: Vec<String> = std::iter::once(&grammar.name)
            .chain(grammar.aliases.iter())
            .map(|tag| tag.to_lowercase())
            .collect();
        for tag in tags {
            if let Some(old) = self.by_tag.insert(tag.clone(), idx) {
                tracing::debug!("Grammar for '{}' replaced (was #{})", tag, old);
            }
        }
        self.grammars.push(grammar);
        Ok(())
    }

    /// Looks up a grammar by tag.
    pub fn get(&self, tag: &str) -> Option<&Grammar> {
        self.by_tag
            .get(&tag.trim().to_lowercase())
            .map(|&idx| &self.grammars[idx])
    }

    /// Looks up a grammar by tag, failing with [`SyntaxError::UnknownLanguage`].
    pub fn lookup(&self, tag: &str) -> Result<&Grammar, SyntaxError> {
        self.get(tag)
            .ok_or_else(|| SyntaxError::UnknownLanguage(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    /// Returns the grammars currently reachable by at least one tag.
    pub fn grammars(&self) -> impl Iterator<Item = &Grammar> {
        self.grammars
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.by_tag.values().any(|v| v == idx))
            .map(|(_, g)| g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_sorted_by_priority() {
        let grammar = Grammar::new("demo")
            .rule(Rule::operators("+"))
            .rule(Rule::keywords(&["let"]))
            .rule(Rule::line_comment("//"))
            .rule(Rule::block_comment("/*", "*/"))
            .rule(Rule::string("\""))
            .rule(Rule::number());

        let priorities: Vec<u8> = grammar.rules().iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3, 4, 5, 7]);
    }

    #[test]
    fn test_equal_priority_keeps_insertion_order() {
        let grammar = Grammar::new("py")
            .rule(Rule::multiline_string("\"\"\""))
            .rule(Rule::string("\""));
        match &grammar.rules()[0].matcher {
            Matcher::Quoted { delimiter, .. } => assert_eq!(*delimiter, "\"\"\""),
            other => panic!("unexpected matcher {other:?}"),
        }
    }

    #[test]
    fn test_registry_case_insensitive_lookup() {
        let mut registry = GrammarRegistry::new();
        registry
            .register(Grammar::new("Python").alias("py"))
            .unwrap();
        assert!(registry.get("python").is_some());
        assert!(registry.get("PY").is_some());
        assert!(registry.get("ruby").is_none());
        assert_eq!(
            registry.lookup("ruby").unwrap_err(),
            SyntaxError::UnknownLanguage("ruby".to_string())
        );
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let mut registry = GrammarRegistry::new();
        assert_eq!(
            registry.register(Grammar::new("  ")),
            Err(SyntaxError::EmptyLanguageName)
        );
    }

    #[test]
    fn test_register_replaces_existing_tag() {
        let mut registry = GrammarRegistry::new();
        registry.register(Grammar::new("demo")).unwrap();
        registry
            .register(Grammar::new("demo").rule(Rule::number()))
            .unwrap();
        assert_eq!(registry.get("demo").unwrap().rules().len(), 1);
        assert_eq!(registry.grammars().count(), 1);
    }

    #[test]
    fn test_number_scanning() {
        assert_eq!(scan_number("0x1F;", 0, false), Some(4));
        assert_eq!(scan_number("3.14)", 0, false), Some(4));
        assert_eq!(scan_number("1e-9 ", 0, false), Some(4));
        assert_eq!(scan_number("12px", 0, true), Some(4));
        assert_eq!(scan_number("12px", 0, false), Some(2));
        assert_eq!(scan_number("1..2", 0, false), Some(1));
        assert_eq!(scan_number("abc", 0, false), None);
    }

    #[test]
    fn test_quoted_scanning() {
        assert_eq!(scan_quoted(r#""a\"b" x"#, 0, "\"", false), 6);
        assert_eq!(scan_quoted("'open\nnext", 0, "'", false), 5);
        assert_eq!(scan_quoted("`a\nb` c", 0, "`", true), 5);
        assert_eq!(scan_quoted("\"never closed", 0, "\"", false), 13);
    }

    #[test]
    fn test_char_literal_scanning() {
        assert_eq!(scan_char_literal("'x' + 1", 0), Some(3));
        assert_eq!(scan_char_literal("'\"'", 0), Some(3));
        assert_eq!(scan_char_literal(r"'\n'", 0), Some(4));
        assert_eq!(scan_char_literal(r"'\''", 0), Some(4));
        assert_eq!(scan_char_literal(r"'\u{1F600}' x", 0), Some(11));
        assert_eq!(scan_char_literal("c = 'é';", 4), Some(4 + 2 + 'é'.len_utf8()));
    }

    #[test]
    fn test_lifetimes_are_not_char_literals() {
        assert_eq!(scan_char_literal("'a str", 0), None);
        assert_eq!(scan_char_literal("'static>", 0), None);
        assert_eq!(scan_char_literal("''", 0), None);
        assert_eq!(scan_char_literal("'\n'", 0), None);
        assert_eq!(scan_char_literal(r"'\u{41", 0), None);
    }

    #[test]
    fn test_word_end() {
        let grammar = Grammar::new("css").word_chars("-@", "-");
        assert_eq!(grammar.word_end("font-size: 1", 0), Some(9));
        assert_eq!(grammar.word_end("@media x", 0), Some(6));
        assert_eq!(grammar.word_end("1abc", 0), None);
    }
}
