//! Built-in grammars.

use crate::grammar::{Grammar, Rule};

/// Operator and punctuation characters shared by C-family grammars.
const C_OPERATORS: &str = "+-*/%=<>!&|^~?:,;.()[]{}";

// ============================================================================
// Word lists
// ============================================================================

fn js_keywords() -> &'static [&'static str] {
    &[
        "const", "let", "var", "function", "return", "if", "else", "for", "while", "do",
        "switch", "case", "break", "continue", "class", "import", "export", "default",
        "async", "await", "try", "catch", "finally", "throw", "new", "this", "super",
        "extends", "static", "typeof", "instanceof", "in", "of", "delete", "void",
        "yield", "true", "false", "null", "undefined", "from", "as",
    ]
}

fn ts_keywords() -> &'static [&'static str] {
    &[
        "const", "let", "var", "function", "return", "if", "else", "for", "while", "do",
        "switch", "case", "break", "continue", "class", "import", "export", "default",
        "async", "await", "try", "catch", "finally", "throw", "new", "this", "super",
        "extends", "implements", "static", "typeof", "instanceof", "in", "of", "delete",
        "void", "yield", "true", "false", "null", "undefined", "from", "as",
        "interface", "type", "enum", "namespace", "module", "declare", "public",
        "private", "protected", "readonly", "abstract", "keyof", "any", "unknown",
        "never", "string", "number", "boolean",
    ]
}

fn js_builtins() -> &'static [&'static str] {
    &[
        "console", "document", "window", "Math", "Date", "Array", "Object", "String",
        "Number", "Boolean", "Promise", "fetch", "JSON", "localStorage",
        "sessionStorage", "Map", "Set", "Symbol", "Error", "RegExp", "parseInt",
        "parseFloat", "setTimeout", "setInterval", "require",
    ]
}

fn python_keywords() -> &'static [&'static str] {
    &[
        "def", "class", "import", "from", "as", "if", "elif", "else", "for", "while",
        "try", "except", "finally", "with", "return", "yield", "pass", "break",
        "continue", "raise", "True", "False", "None", "and", "or", "not", "in", "is",
        "lambda", "global", "nonlocal", "del", "assert", "async", "await",
    ]
}

fn python_builtins() -> &'static [&'static str] {
    &[
        "print", "len", "range", "enumerate", "zip", "map", "filter", "sorted",
        "reversed", "min", "max", "sum", "abs", "round", "isinstance", "issubclass",
        "hasattr", "getattr", "setattr", "super", "property", "staticmethod",
        "classmethod", "open", "input", "repr", "format", "iter", "next", "any", "all",
        "int", "float", "str", "bool", "list", "dict", "tuple", "set", "bytes", "type",
        "object",
    ]
}

fn java_keywords() -> &'static [&'static str] {
    &[
        "public", "private", "protected", "static", "final", "abstract", "class",
        "interface", "enum", "record", "extends", "implements", "import", "package",
        "new", "this", "super", "return", "if", "else", "for", "while", "do", "switch",
        "case", "default", "try", "catch", "finally", "throw", "throws", "break",
        "continue", "void", "int", "long", "float", "double", "boolean", "char", "byte",
        "short", "var", "synchronized", "volatile", "transient", "instanceof", "null",
        "true", "false",
    ]
}

fn java_builtins() -> &'static [&'static str] {
    &[
        "String", "Object", "System", "Integer", "Long", "Double", "Boolean",
        "List", "ArrayList", "Map", "HashMap", "Set", "HashSet", "Optional", "Math",
        "Arrays", "Collections", "Exception", "RuntimeException", "Thread",
    ]
}

fn c_keywords() -> &'static [&'static str] {
    &[
        "auto", "break", "case", "char", "const", "continue", "default", "do", "double",
        "else", "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long",
        "register", "restrict", "return", "short", "signed", "sizeof", "static",
        "struct", "switch", "typedef", "union", "unsigned", "void", "volatile", "while",
    ]
}

fn c_builtins() -> &'static [&'static str] {
    &[
        "printf", "scanf", "malloc", "free", "calloc", "realloc", "strcpy", "strcat",
        "strlen", "strcmp", "fopen", "fclose", "fread", "fwrite", "fprintf", "fscanf",
        "getchar", "putchar", "gets", "puts", "atoi", "atof", "sprintf", "sscanf",
        "memcpy", "memmove", "memset", "memcmp", "qsort", "bsearch", "rand", "srand",
        "time", "clock", "exit", "abort", "assert", "NULL", "size_t", "FILE",
    ]
}

fn cpp_keywords() -> &'static [&'static str] {
    &[
        "auto", "break", "case", "char", "const", "continue", "default", "do", "double",
        "else", "enum", "extern", "float", "for", "goto", "if", "int", "long",
        "register", "return", "short", "signed", "sizeof", "static", "struct",
        "switch", "typedef", "union", "unsigned", "void", "volatile", "while", "class",
        "namespace", "template", "typename", "virtual", "public", "private",
        "protected", "friend", "inline", "explicit", "mutable", "operator", "this",
        "new", "delete", "true", "false", "nullptr", "using", "decltype", "constexpr",
        "noexcept", "override", "final", "const_cast", "dynamic_cast",
        "reinterpret_cast", "static_cast", "try", "catch", "throw", "bool",
    ]
}

fn cpp_builtins() -> &'static [&'static str] {
    &[
        "std", "cout", "cin", "cerr", "endl", "string", "vector", "map", "set", "list",
        "queue", "stack", "unique_ptr", "shared_ptr", "weak_ptr", "make_unique",
        "make_shared", "move", "forward", "printf", "malloc", "free", "size_t",
    ]
}

fn rust_keywords() -> &'static [&'static str] {
    &[
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
        "enum", "extern", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
        "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct",
        "super", "trait", "type", "unsafe", "use", "where", "while", "true", "false",
    ]
}

fn rust_builtins() -> &'static [&'static str] {
    &[
        "String", "Vec", "Option", "Result", "Box", "Rc", "Arc", "HashMap", "HashSet",
        "Some", "None", "Ok", "Err", "println", "format", "vec", "panic", "assert",
        "assert_eq", "bool", "char", "str", "u8", "u16", "u32", "u64", "usize", "i8",
        "i16", "i32", "i64", "isize", "f32", "f64",
    ]
}

fn go_keywords() -> &'static [&'static str] {
    &[
        "break", "case", "chan", "const", "continue", "default", "defer", "else",
        "fallthrough", "for", "func", "go", "goto", "if", "import", "interface", "map",
        "package", "range", "return", "select", "struct", "switch", "type", "var",
        "true", "false", "nil", "iota",
    ]
}

fn go_builtins() -> &'static [&'static str] {
    &[
        "append", "cap", "close", "copy", "delete", "len", "make", "new", "panic",
        "print", "println", "recover", "fmt", "error", "string", "int", "int64",
        "float64", "bool", "byte", "rune",
    ]
}

fn shell_keywords() -> &'static [&'static str] {
    &[
        "if", "then", "else", "elif", "fi", "for", "while", "until", "do", "done",
        "case", "esac", "in", "function", "return", "local", "export", "select",
    ]
}

fn shell_builtins() -> &'static [&'static str] {
    &[
        "echo", "cd", "pwd", "ls", "cat", "grep", "sed", "awk", "set", "unset", "read",
        "source", "exit", "test", "printf", "shift", "trap", "eval", "exec", "mkdir",
        "rm", "cp", "mv", "chmod", "curl", "git",
    ]
}

fn sql_keywords() -> &'static [&'static str] {
    &[
        "select", "from", "where", "insert", "into", "values", "update", "set",
        "delete", "create", "table", "drop", "alter", "add", "index", "join", "left",
        "right", "inner", "outer", "on", "group", "by", "order", "having", "limit",
        "offset", "as", "and", "or", "not", "null", "is", "in", "between", "like",
        "distinct", "union", "all", "case", "when", "then", "else", "end", "primary",
        "key", "foreign", "references", "default", "exists", "asc", "desc",
    ]
}

fn sql_builtins() -> &'static [&'static str] {
    &[
        "count", "sum", "avg", "min", "max", "coalesce", "cast", "ifnull", "nullif",
        "upper", "lower", "now", "int", "integer", "varchar", "text", "boolean", "date",
        "timestamp",
    ]
}

fn html_tags() -> &'static [&'static str] {
    &[
        "html", "head", "body", "title", "meta", "link", "script", "style", "div",
        "span", "p", "a", "img", "ul", "ol", "li", "table", "tr", "td", "th", "thead",
        "tbody", "form", "input", "button", "label", "select", "option", "textarea",
        "h1", "h2", "h3", "h4", "h5", "h6", "header", "footer", "nav", "main",
        "section", "article", "pre", "code", "br", "hr", "DOCTYPE",
    ]
}

fn html_attributes() -> &'static [&'static str] {
    &[
        "class", "id", "href", "src", "style", "type", "name", "value", "alt", "title",
        "rel", "charset", "content", "width", "height", "placeholder", "disabled",
        "onclick", "action", "method", "for", "lang",
    ]
}

fn css_keywords() -> &'static [&'static str] {
    &[
        "@media", "@import", "@font-face", "@keyframes", "@supports", "!important",
        "inherit", "initial", "unset", "auto", "none", "block", "inline", "flex", "grid",
        "absolute", "relative", "fixed", "sticky", "solid", "bold",
    ]
}

fn css_properties() -> &'static [&'static str] {
    &[
        "color", "background", "background-color", "border", "border-radius", "margin",
        "padding", "width", "height", "display", "position", "top", "left", "right",
        "bottom", "font", "font-size", "font-family", "font-weight", "line-height",
        "text-align", "flex-direction", "justify-content", "align-items", "gap",
        "overflow", "z-index", "opacity", "transition", "transform", "cursor",
        "box-shadow", "rgb", "rgba", "hsl", "calc", "var", "url",
    ]
}

// ============================================================================
// Grammars
// ============================================================================

fn javascript() -> Grammar {
    Grammar::new("javascript")
        .alias("js")
        .alias("jsx")
        .word_chars("$", "")
        .rule(Rule::block_comment("/*", "*/"))
        .rule(Rule::line_comment("//"))
        .rule(Rule::string("\""))
        .rule(Rule::string("'"))
        .rule(Rule::multiline_string("`"))
        .rule(Rule::number())
        .rule(Rule::keywords(js_keywords()))
        .rule(Rule::builtins(js_builtins()))
        .rule(Rule::operators(C_OPERATORS))
}

fn typescript() -> Grammar {
    Grammar::new("typescript")
        .alias("ts")
        .alias("tsx")
        .word_chars("$", "")
        .rule(Rule::block_comment("/*", "*/"))
        .rule(Rule::line_comment("//"))
        .rule(Rule::string("\""))
        .rule(Rule::string("'"))
        .rule(Rule::multiline_string("`"))
        .rule(Rule::number())
        .rule(Rule::keywords(ts_keywords()))
        .rule(Rule::builtins(js_builtins()))
        .rule(Rule::operators(C_OPERATORS))
}

fn python() -> Grammar {
    Grammar::new("python")
        .alias("py")
        .alias("python3")
        .rule(Rule::line_comment("#"))
        .rule(Rule::multiline_string("\"\"\""))
        .rule(Rule::multiline_string("'''"))
        .rule(Rule::string("\""))
        .rule(Rule::string("'"))
        .rule(Rule::number())
        .rule(Rule::keywords(python_keywords()))
        .rule(Rule::builtins(python_builtins()))
        .rule(Rule::operators("+-*/%=<>!&|^~:,;.()[]{}@"))
}

fn java() -> Grammar {
    Grammar::new("java")
        .rule(Rule::block_comment("/*", "*/"))
        .rule(Rule::line_comment("//"))
        .rule(Rule::multiline_string("\"\"\""))
        .rule(Rule::string("\""))
        .rule(Rule::string("'"))
        .rule(Rule::number_with_suffixes())
        .rule(Rule::keywords(java_keywords()))
        .rule(Rule::builtins(java_builtins()))
        .rule(Rule::operators(C_OPERATORS))
}

fn c() -> Grammar {
    Grammar::new("c")
        .alias("h")
        .rule(Rule::block_comment("/*", "*/"))
        .rule(Rule::line_comment("//"))
        .rule(Rule::string("\""))
        .rule(Rule::string("'"))
        .rule(Rule::number_with_suffixes())
        .rule(Rule::keywords(c_keywords()))
        .rule(Rule::builtins(c_builtins()))
        .rule(Rule::operators(C_OPERATORS))
}

fn cpp() -> Grammar {
    Grammar::new("cpp")
        .alias("c++")
        .alias("cxx")
        .alias("hpp")
        .rule(Rule::block_comment("/*", "*/"))
        .rule(Rule::line_comment("//"))
        .rule(Rule::string("\""))
        .rule(Rule::string("'"))
        .rule(Rule::number_with_suffixes())
        .rule(Rule::keywords(cpp_keywords()))
        .rule(Rule::builtins(cpp_builtins()))
        .rule(Rule::operators(C_OPERATORS))
}

fn rust() -> Grammar {
    Grammar::new("rust")
        .alias("rs")
        .rule(Rule::block_comment("/*", "*/"))
        .rule(Rule::line_comment("//"))
        .rule(Rule::multiline_string("\""))
        .rule(Rule::char_literal())
        .rule(Rule::number_with_suffixes())
        .rule(Rule::keywords(rust_keywords()))
        .rule(Rule::builtins(rust_builtins()))
        .rule(Rule::operators("+-*/%=<>!&|^~?:,;.()[]{}#'"))
}

fn go() -> Grammar {
    Grammar::new("go")
        .alias("golang")
        .rule(Rule::block_comment("/*", "*/"))
        .rule(Rule::line_comment("//"))
        .rule(Rule::string("\""))
        .rule(Rule::string("'"))
        .rule(Rule::multiline_string("`"))
        .rule(Rule::number())
        .rule(Rule::keywords(go_keywords()))
        .rule(Rule::builtins(go_builtins()))
        .rule(Rule::operators(C_OPERATORS))
}

fn shell() -> Grammar {
    Grammar::new("bash")
        .alias("sh")
        .alias("shell")
        .alias("zsh")
        .word_chars("$", "")
        .rule(Rule::line_comment("#"))
        .rule(Rule::multiline_string("\""))
        .rule(Rule::multiline_string("'"))
        .rule(Rule::number())
        .rule(Rule::keywords(shell_keywords()))
        .rule(Rule::builtins(shell_builtins()))
        .rule(Rule::operators("|&;<>()[]{}=!"))
}

fn sql() -> Grammar {
    Grammar::new("sql")
        .rule(Rule::block_comment("/*", "*/"))
        .rule(Rule::line_comment("--"))
        .rule(Rule::string("'"))
        .rule(Rule::string("\""))
        .rule(Rule::number())
        .rule(Rule::keywords_ignore_case(sql_keywords()))
        .rule(Rule::builtins_ignore_case(sql_builtins()))
        .rule(Rule::operators("+-*/%=<>!,;.()"))
}

fn html() -> Grammar {
    Grammar::new("html")
        .alias("htm")
        .alias("xml")
        .word_chars("", "-")
        .rule(Rule::block_comment("<!--", "-->"))
        .rule(Rule::string("\""))
        .rule(Rule::keywords(html_tags()))
        .rule(Rule::builtins(html_attributes()))
        .rule(Rule::operators("<>/=!"))
}

fn css() -> Grammar {
    Grammar::new("css")
        .alias("scss")
        .word_chars("@-!", "-")
        .rule(Rule::block_comment("/*", "*/"))
        .rule(Rule::string("\""))
        .rule(Rule::string("'"))
        .rule(Rule::number_with_suffixes())
        .rule(Rule::keywords(css_keywords()))
        .rule(Rule::builtins(css_properties()))
        .rule(Rule::operators("+*/%=<>:,;.()[]{}#~"))
}

fn json() -> Grammar {
    Grammar::new("json")
        .rule(Rule::string("\""))
        .rule(Rule::number())
        .rule(Rule::keywords(&["true", "false", "null"]))
        .rule(Rule::operators("{}[]:,-"))
}

/// All built-in grammars, in registration order.
pub(crate) fn builtin() -> Vec<Grammar> {
    vec![
        javascript(),
        typescript(),
        python(),
        java(),
        c(),
        cpp(),
        rust(),
        go(),
        shell(),
        sql(),
        html(),
        css(),
        json(),
    ]
}

#[cfg(test)]
mod tests {
    use crate::grammar::{GrammarRegistry, TokenCategory};
    use crate::highlighter::Highlighter;

    fn categories(code: &str, lang: &str) -> Vec<(TokenCategory, String)> {
        let registry = GrammarRegistry::with_builtin();
        Highlighter::new(&registry)
            .tokenize(code, lang)
            .into_iter()
            .filter(|s| s.category != TokenCategory::Plain)
            .map(|s| (s.category, s.text))
            .collect()
    }

    #[test]
    fn test_every_builtin_has_rules() {
        let registry = GrammarRegistry::with_builtin();
        for grammar in registry.grammars() {
            assert!(!grammar.rules().is_empty(), "{} has no rules", grammar.name());
        }
    }

    #[test]
    fn test_aliases_resolve() {
        let registry = GrammarRegistry::with_builtin();
        for tag in ["js", "ts", "py", "rs", "sh", "shell", "c++", "golang", "htm", "scss"] {
            assert!(registry.contains(tag), "missing alias {tag}");
        }
    }

    #[test]
    fn test_python_triple_quoted_string() {
        let cats = categories("x = \"\"\"a\n'b'\n\"\"\"", "py");
        assert!(cats.contains(&(TokenCategory::String, "\"\"\"a\n'b'\n\"\"\"".to_string())));
    }

    #[test]
    fn test_javascript_template_literal_spans_lines() {
        let cats = categories("let s = `a\n${b}`;", "js");
        assert!(cats.contains(&(TokenCategory::String, "`a\n${b}`".to_string())));
    }

    #[test]
    fn test_sql_keywords_ignore_case() {
        let cats = categories("SELECT count(*) FROM t -- all", "sql");
        assert_eq!(cats[0], (TokenCategory::Keyword, "SELECT".to_string()));
        assert_eq!(cats[1], (TokenCategory::Builtin, "count".to_string()));
        assert!(cats.contains(&(TokenCategory::Keyword, "FROM".to_string())));
        assert_eq!(
            cats.last().unwrap(),
            &(TokenCategory::Comment, "-- all".to_string())
        );
    }

    #[test]
    fn test_css_property_and_units() {
        let cats = categories("a { font-size: 12px; }", "css");
        assert!(cats.contains(&(TokenCategory::Builtin, "font-size".to_string())));
        assert!(cats.contains(&(TokenCategory::Number, "12px".to_string())));
    }

    #[test]
    fn test_c_hex_and_builtin() {
        let cats = categories("int x = 0xFF; printf(\"%d\", x);", "c");
        assert!(cats.contains(&(TokenCategory::Number, "0xFF".to_string())));
        assert!(cats.contains(&(TokenCategory::Builtin, "printf".to_string())));
        assert!(cats.contains(&(TokenCategory::String, "\"%d\"".to_string())));
    }

    #[test]
    fn test_rust_char_literal_holding_quote() {
        let cats = categories("let q = '\"';\nlet n = 1;\nfn f() {}\n", "rust");
        assert!(cats.contains(&(TokenCategory::String, "'\"'".to_string())));
        let keywords: Vec<&str> = cats
            .iter()
            .filter(|(cat, _)| *cat == TokenCategory::Keyword)
            .map(|(_, text)| text.as_str())
            .collect();
        assert_eq!(keywords, vec!["let", "let", "fn"]);
        assert!(cats.contains(&(TokenCategory::Number, "1".to_string())));
    }

    #[test]
    fn test_rust_lifetime_is_not_a_string() {
        let cats = categories("fn f<'a>(s: &'a str) -> &'static str { s }", "rust");
        assert!(cats.iter().all(|(cat, _)| *cat != TokenCategory::String));
        assert!(cats.contains(&(TokenCategory::Builtin, "str".to_string())));
    }

    #[test]
    fn test_html_comment() {
        let cats = categories("<!-- note --><p>", "html");
        assert_eq!(cats[0], (TokenCategory::Comment, "&lt;!-- note --&gt;".to_string()));
    }

    #[test]
    fn test_html_apostrophe_in_text() {
        let cats = categories("<p class=\"x\">Don't stop</p>", "html");
        let strings: Vec<&str> = cats
            .iter()
            .filter(|(cat, _)| *cat == TokenCategory::String)
            .map(|(_, text)| text.as_str())
            .collect();
        assert_eq!(strings, vec!["\"x\""]);
        assert!(cats.contains(&(TokenCategory::Keyword, "p".to_string())));
    }

    #[test]
    fn test_shell_variables_are_plain() {
        let cats = categories("echo $HOME # home", "bash");
        assert_eq!(
            cats,
            vec![
                (TokenCategory::Builtin, "echo".to_string()),
                (TokenCategory::Comment, "# home".to_string()),
            ]
        );
    }
}
