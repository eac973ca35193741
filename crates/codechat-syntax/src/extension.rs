//! Language tag → file extension mapping.

/// Extension used for any tag the table does not know.
pub const DEFAULT_EXTENSION: &str = "txt";

/// Maps fenced-code language tags to file extensions.
///
/// This is a total function: unknown or empty tags resolve to
/// [`DEFAULT_EXTENSION`], so a derived filename always has an extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionResolver;

impl ExtensionResolver {
    /// Resolves a language tag (case-insensitive) to a file extension.
    pub fn resolve(language: &str) -> &'static str {
        match language.trim().to_ascii_lowercase().as_str() {
            "javascript" | "js" | "jsx" | "node" => "js",
            "typescript" | "ts" | "tsx" => "ts",
            "html" | "htm" => "html",
            "css" => "css",
            "scss" => "scss",
            "python" | "py" | "python3" => "py",
            "java" => "java",
            "cpp" | "c++" | "cxx" => "cpp",
            "hpp" => "hpp",
            "c" => "c",
            "h" => "h",
            "csharp" | "cs" | "c#" => "cs",
            "php" => "php",
            "ruby" | "rb" => "rb",
            "go" | "golang" => "go",
            "rust" | "rs" => "rs",
            "swift" => "swift",
            "kotlin" | "kt" => "kt",
            "scala" => "scala",
            "r" => "r",
            "sql" => "sql",
            "bash" | "shell" | "sh" | "zsh" => "sh",
            "yaml" | "yml" => "yml",
            "toml" => "toml",
            "json" => "json",
            "xml" => "xml",
            "markdown" | "md" => "md",
            "lua" => "lua",
            "dart" => "dart",
            _ => DEFAULT_EXTENSION,
        }
    }

    /// Builds the filename used when a fence carries no filename hint.
    pub fn default_filename(language: &str) -> String {
        format!("{}.{}", language, Self::resolve(language))
    }
}
