//! @ai:module:intent Define language-specific comment formats and strip comment markers
//! @ai:module:layer domain
//! @ai:module:public_api Language, CommentStyle, detect_language, is_supported_file, strip_comment_markers
//! @ai:module:stateless true

use std::path::Path;

/// @ai:intent Represents a supported programming language with its comment syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Go,
    Rust,
    Python,
    TypeScript,
    JavaScript,
    Java,
    Kotlin,
    Swift,
    CSharp,
    C,
    Cpp,
    Php,
    Ruby,
    Shell,
    Sql,
}

/// @ai:intent Comment style configuration for a language
#[derive(Debug, Clone)]
pub struct CommentStyle {
    pub single_line: Vec<&'static str>,
    pub block_start: Option<&'static str>,
    pub block_end: Option<&'static str>,
    /// Triple-quoted strings that start a statement are documentation blocks
    pub docstrings: bool,
}

const ALL_LANGUAGES: [Language; 15] = [
    Language::Go,
    Language::Rust,
    Language::Python,
    Language::TypeScript,
    Language::JavaScript,
    Language::Java,
    Language::Kotlin,
    Language::Swift,
    Language::CSharp,
    Language::C,
    Language::Cpp,
    Language::Php,
    Language::Ruby,
    Language::Shell,
    Language::Sql,
];

/// Line prefixes removed from a comment line, longest first.
const MARKER_PREFIXES: [&str; 10] = [
    "///", "//!", "//", "/**", "/*", "\"\"\"", "'''", "--", "#", "*",
];

/// Line suffixes removed from a comment line.
const MARKER_SUFFIXES: [&str; 3] = ["*/", "\"\"\"", "'''"];

impl Language {
    /// @ai:intent Get the comment style for this language
    /// @ai:effects pure
    pub fn comment_style(&self) -> CommentStyle {
        match self {
            Language::Go
            | Language::Rust
            | Language::TypeScript
            | Language::JavaScript
            | Language::Java
            | Language::Kotlin
            | Language::Swift
            | Language::CSharp
            | Language::C
            | Language::Cpp => CommentStyle {
                single_line: vec!["//"],
                block_start: Some("/*"),
                block_end: Some("*/"),
                docstrings: false,
            },
            Language::Php => CommentStyle {
                single_line: vec!["//", "#"],
                block_start: Some("/*"),
                block_end: Some("*/"),
                docstrings: false,
            },
            Language::Python => CommentStyle {
                single_line: vec!["#"],
                block_start: None,
                block_end: None,
                docstrings: true,
            },
            Language::Ruby | Language::Shell => CommentStyle {
                single_line: vec!["#"],
                block_start: None,
                block_end: None,
                docstrings: false,
            },
            Language::Sql => CommentStyle {
                single_line: vec!["--"],
                block_start: Some("/*"),
                block_end: Some("*/"),
                docstrings: false,
            },
        }
    }

    /// @ai:intent Get file extensions for this language
    /// @ai:effects pure
    pub fn extensions(&self) -> &[&str] {
        match self {
            Language::Go => &["go"],
            Language::Rust => &["rs"],
            Language::Python => &["py", "pyi"],
            Language::TypeScript => &["ts", "tsx"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::Java => &["java"],
            Language::Kotlin => &["kt", "kts"],
            Language::Swift => &["swift"],
            Language::CSharp => &["cs"],
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "cc", "cxx", "hpp", "hh", "hxx"],
            Language::Php => &["php"],
            Language::Ruby => &["rb"],
            Language::Shell => &["sh", "bash"],
            Language::Sql => &["sql"],
        }
    }

    /// @ai:intent Get language name as string, as reported in scan logs
    /// @ai:effects pure
    pub fn name(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Python => "python",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::Swift => "swift",
            Language::CSharp => "csharp",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Shell => "shell",
            Language::Sql => "sql",
        }
    }
}

/// @ai:intent Detect the programming language from a file path
/// @ai:pre path is a valid file path
/// @ai:post result is Some if extension is recognized
/// @ai:example ("main.go") -> Some(Go)
/// @ai:example ("test.py") -> Some(Python)
/// @ai:example ("notes.txt") -> None
/// @ai:effects pure
pub fn detect_language(path: &Path) -> Option<Language> {
    let ext = path.extension()?.to_str()?;

    ALL_LANGUAGES
        .into_iter()
        .find(|lang| lang.extensions().contains(&ext))
}

/// @ai:intent Check if a file should be scanned based on extension
/// @ai:effects pure
pub fn is_supported_file(path: &Path) -> bool {
    detect_language(path).is_some()
}

/// @ai:intent Remove comment markers and surrounding whitespace from one raw comment line
/// @ai:post result carries no leading marker from any supported language
/// @ai:example ("// service:uses Redis") -> "service:uses Redis"
/// @ai:example (" * proto:tcp") -> "proto:tcp"
/// @ai:example ("/* technology:grpc */") -> "technology:grpc"
/// @ai:effects pure
pub fn strip_comment_markers(line: &str) -> &str {
    let mut text = line.trim();

    for suffix in MARKER_SUFFIXES {
        if let Some(rest) = text.strip_suffix(suffix) {
            text = rest.trim_end();
            break;
        }
    }

    for prefix in MARKER_PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest;
            break;
        }
    }

    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_go() {
        assert_eq!(detect_language(Path::new("main.go")), Some(Language::Go));
    }

    #[test]
    fn test_detect_python() {
        assert_eq!(
            detect_language(Path::new("test.py")),
            Some(Language::Python)
        );
    }

    #[test]
    fn test_language_names_are_distinct() {
        assert_eq!(Language::CSharp.name(), "csharp");

        let names: std::collections::HashSet<_> = ALL_LANGUAGES.iter().map(|l| l.name()).collect();
        assert_eq!(names.len(), ALL_LANGUAGES.len());
    }

    #[test]
    fn test_python_uses_docstrings_not_block_markers() {
        let style = Language::Python.comment_style();
        assert!(style.docstrings);
        assert_eq!(style.block_start, None);
        assert!(!Language::Go.comment_style().docstrings);
    }

    #[test]
    fn test_detect_typescript() {
        assert_eq!(
            detect_language(Path::new("client.tsx")),
            Some(Language::TypeScript)
        );
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(detect_language(Path::new("test.txt")), None);
        assert_eq!(detect_language(Path::new("Makefile")), None);
    }

    #[test]
    fn test_strip_line_comment_markers() {
        assert_eq!(strip_comment_markers("// service:uses Redis"), "service:uses Redis");
        assert_eq!(strip_comment_markers("/// service:name Api"), "service:name Api");
        assert_eq!(strip_comment_markers("//! owner: team-a"), "owner: team-a");
        assert_eq!(strip_comment_markers("#   proto:tcp"), "proto:tcp");
        assert_eq!(strip_comment_markers("-- technology:postgres"), "technology:postgres");
    }

    #[test]
    fn test_strip_block_comment_markers() {
        assert_eq!(strip_comment_markers("/* technology:grpc */"), "technology:grpc");
        assert_eq!(strip_comment_markers("/**"), "");
        assert_eq!(strip_comment_markers("   * proto:http"), "proto:http");
        assert_eq!(strip_comment_markers(" */"), "");
        assert_eq!(strip_comment_markers("\"\"\"service:sends Kafka"), "service:sends Kafka");
        assert_eq!(strip_comment_markers("'''proto:amqp'''"), "proto:amqp");
    }

    #[test]
    fn test_strip_plain_text_is_trimmed() {
        assert_eq!(strip_comment_markers("  service:uses S3  "), "service:uses S3");
    }
}
