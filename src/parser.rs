//! @ai:module:intent Parse source files and extract raw comment blocks in document order
//! @ai:module:layer application
//! @ai:module:public_api parse_file, parse_source, CommentBlock, CommentLine, ParsedSource
//! @ai:module:depends_on language, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::language::{detect_language, CommentStyle, Language};
use std::path::Path;

/// @ai:intent Represents a block of adjacent comment lines, or one block comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBlock {
    pub lines: Vec<CommentLine>,
    pub start_line: usize,
    pub end_line: usize,
}

/// @ai:intent Represents a single raw comment line, markers included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    pub line_number: usize,
    pub raw: String,
}

/// @ai:intent Parsed source file with extracted comment blocks
#[derive(Debug)]
pub struct ParsedSource {
    pub language: Language,
    pub comment_blocks: Vec<CommentBlock>,
}

/// @ai:intent Parse a source file and extract its comment blocks
/// @ai:pre path exists, is readable and has a supported extension
/// @ai:post comment_blocks are ordered by start_line
/// @ai:effects fs:read
pub fn parse_file(path: &Path) -> Result<ParsedSource> {
    let language = detect_language(path)
        .ok_or_else(|| Error::UnsupportedFileType(path.display().to_string()))?;

    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let comment_blocks = parse_source(path, &content, language)?;

    Ok(ParsedSource {
        language,
        comment_blocks,
    })
}

/// @ai:intent Extract all comment blocks from source content
/// @ai:post a blank or code line ends a run of line comments
/// @ai:edge_cases an unterminated block comment fails the whole file
/// @ai:effects pure
pub fn parse_source(path: &Path, content: &str, language: Language) -> Result<Vec<CommentBlock>> {
    let style = language.comment_style();
    if style.docstrings {
        return parse_docstring_source(path, content, &style);
    }

    let mut blocks = Vec::new();
    let mut run: Option<CommentBlock> = None;
    let mut open_block: Option<CommentBlock> = None;

    for (line_idx, line) in content.lines().enumerate() {
        let line_number = line_idx + 1;

        if let Some(mut block) = open_block.take() {
            block.push(line_number, line);
            if style.block_end.is_some_and(|end| line.contains(end)) {
                blocks.push(block);
            } else {
                open_block = Some(block);
            }
            continue;
        }

        let trimmed = line.trim();

        if is_line_comment(trimmed, &style) {
            match &mut run {
                Some(block) => block.push(line_number, line),
                None => run = Some(CommentBlock::new(line_number, line)),
            }
            continue;
        }

        if let Some(block) = run.take() {
            blocks.push(block);
        }

        if let (Some(start), Some(end)) = (style.block_start, style.block_end) {
            if let Some(rest) = trimmed.strip_prefix(start) {
                let block = CommentBlock::new(line_number, line);
                if rest.contains(end) {
                    blocks.push(block);
                } else {
                    open_block = Some(block);
                }
            }
        }
    }

    if let Some(block) = open_block {
        return Err(unterminated(path, block.start_line, "block comment"));
    }

    if let Some(block) = run {
        blocks.push(block);
    }

    Ok(blocks)
}

const TRIPLE_QUOTES: [&str; 2] = ["\"\"\"", "'''"];

/// String prefix letters allowed before a triple quote (`r`, `b`, `f`, `u` and pairs such as `rb`).
const STRING_PREFIX_CHARS: &str = "rRbBfFuU";

/// @ai:intent Extract comment blocks from a language whose statement-level triple-quoted strings are documentation
/// @ai:post triple-quoted string literals in code never open a block, so their closing quotes are not misread
/// @ai:edge_cases a docstring or string literal still open at end of file fails the whole file
/// @ai:effects pure
fn parse_docstring_source(path: &Path, content: &str, style: &CommentStyle) -> Result<Vec<CommentBlock>> {
    let mut blocks = Vec::new();
    let mut run: Option<CommentBlock> = None;
    let mut docstring: Option<(CommentBlock, &'static str)> = None;
    let mut literal: Option<(usize, &'static str)> = None;

    for (line_idx, line) in content.lines().enumerate() {
        let line_number = line_idx + 1;

        if let Some((mut block, quote)) = docstring.take() {
            block.push(line_number, line);
            if line.contains(quote) {
                blocks.push(block);
            } else {
                docstring = Some((block, quote));
            }
            continue;
        }

        if let Some((start_line, quote)) = literal.take() {
            literal = match line.find(quote) {
                Some(pos) => open_string_literal(&line[pos + quote.len()..])
                    .map(|next| (line_number, next)),
                None => Some((start_line, quote)),
            };
            continue;
        }

        let trimmed = line.trim();

        if is_line_comment(trimmed, style) {
            match &mut run {
                Some(block) => block.push(line_number, line),
                None => run = Some(CommentBlock::new(line_number, line)),
            }
            continue;
        }

        if let Some(block) = run.take() {
            blocks.push(block);
        }

        if let Some((quote, rest)) = docstring_opener(trimmed) {
            let block = CommentBlock::new(line_number, line);
            match rest.find(quote) {
                Some(pos) => {
                    blocks.push(block);
                    literal = open_string_literal(&rest[pos + quote.len()..])
                        .map(|next| (line_number, next));
                }
                None => docstring = Some((block, quote)),
            }
            continue;
        }

        literal = open_string_literal(trimmed).map(|quote| (line_number, quote));
    }

    if let Some((block, _)) = docstring {
        return Err(unterminated(path, block.start_line, "docstring"));
    }

    if let Some((start_line, _)) = literal {
        return Err(unterminated(path, start_line, "string literal"));
    }

    if let Some(block) = run {
        blocks.push(block);
    }

    Ok(blocks)
}

/// @ai:intent Recognize a statement that starts with a (possibly prefixed) triple-quoted string
/// @ai:example ("r'''Match digits.") -> Some(("'''", "Match digits."))
/// @ai:example ("QUERY = '''") -> None
/// @ai:effects pure
fn docstring_opener(trimmed: &str) -> Option<(&'static str, &str)> {
    let body = trimmed.trim_start_matches(|c: char| STRING_PREFIX_CHARS.contains(c));
    if trimmed.len() - body.len() > 2 {
        return None;
    }

    TRIPLE_QUOTES
        .into_iter()
        .find_map(|quote| body.strip_prefix(quote).map(|rest| (quote, rest)))
}

/// @ai:intent Find the triple quote left open at the end of a code fragment
/// @ai:post None when every triple-quoted string in the fragment is closed
/// @ai:edge_cases quotes after a `#` belong to a trailing comment and are ignored
/// @ai:effects pure
fn open_string_literal(mut code: &str) -> Option<&'static str> {
    loop {
        let (pos, quote) = TRIPLE_QUOTES
            .into_iter()
            .filter_map(|quote| code.find(quote).map(|pos| (pos, quote)))
            .min_by_key(|(pos, _)| *pos)?;

        if code[..pos].contains('#') {
            return None;
        }

        let rest = &code[pos + quote.len()..];
        match rest.find(quote) {
            Some(end) => code = &rest[end + quote.len()..],
            None => return Some(quote),
        }
    }
}

fn unterminated(path: &Path, line: usize, what: &str) -> Error {
    Error::Parse {
        file: path.to_path_buf(),
        line,
        message: format!("unterminated {what}"),
    }
}

/// @ai:intent Check whether a trimmed line is a single-line comment
/// @ai:effects pure
fn is_line_comment(trimmed: &str, style: &CommentStyle) -> bool {
    style
        .single_line
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

impl CommentBlock {
    fn new(line_number: usize, raw: &str) -> Self {
        Self {
            lines: vec![CommentLine {
                line_number,
                raw: raw.to_string(),
            }],
            start_line: line_number,
            end_line: line_number,
        }
    }

    fn push(&mut self, line_number: usize, raw: &str) {
        self.lines.push(CommentLine {
            line_number,
            raw: raw.to_string(),
        });
        self.end_line = line_number;
    }

    /// @ai:intent Concatenate the raw lines of this block, line breaks preserved
    /// @ai:effects pure
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.raw.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
