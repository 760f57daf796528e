//! Text extraction collaborator.
//!
//! The pipeline consumes extracted document text through the [`TextExtractor`]
//! trait: an ordered list of cleaned lines. [`PlainTextExtractor`] implements
//! it for plain-text sources and applies the same cleanup pass the knowledge
//! base expects from PDF extractors: de-hyphenate words broken across line
//! ends, unwrap soft line breaks, normalize whitespace, and re-wrap
//! paragraphs at a fixed column.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column at which cleaned paragraphs are re-wrapped.
const WRAP_WIDTH: usize = 120;

/// Errors raised while extracting text from a source document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Source file does not exist.
    #[error("document not found: {0}")]
    NotFound(PathBuf),
    /// File extension is not handled by this extractor.
    #[error("unsupported document type '{extension}' for {path}")]
    Unsupported {
        /// Extension that was not recognized.
        extension: String,
        /// Path of the rejected document.
        path: PathBuf,
    },
    /// Document exists but its content could not be decoded.
    #[error("failed to read {path}: {reason}")]
    Unreadable {
        /// Path of the unreadable document.
        path: PathBuf,
        /// Why decoding failed.
        reason: String,
    },
}

/// Source-to-lines contract consumed by the upsert pipeline.
pub trait TextExtractor: Send + Sync {
    /// Extract ordered, cleaned text lines from the document at `path`.
    fn extract_lines(&self, path: &Path) -> Result<Vec<String>, ExtractError>;

    /// Whether this extractor recognizes the file at `path`.
    fn supports(&self, path: &Path) -> bool;
}

/// Extractor for plain-text and markdown sources.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    /// Construct a new plain-text extractor.
    pub const fn new() -> Self {
        Self
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract_lines(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
        if !path.exists() {
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }
        if !self.supports(path) {
            let extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("")
                .to_string();
            return Err(ExtractError::Unsupported {
                extension,
                path: path.to_path_buf(),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|err| ExtractError::Unreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        Ok(clean_lines(&raw))
    }

    fn supports(&self, path: &Path) -> bool {
        matches!(
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_ascii_lowercase())
                .as_deref(),
            Some("txt" | "md" | "markdown")
        )
    }
}

/// Normalize raw extracted text into wrapped lines with blank lines between
/// paragraphs.
pub fn clean_lines(raw: &str) -> Vec<String> {
    let text = fix_hyphenation(raw);
    let text = unwrap_soft_breaks(&text);
    let text = collapse_inline_whitespace(&text);

    let mut lines = Vec::new();
    for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        for line in wrap_paragraph(paragraph, WRAP_WIDTH) {
            lines.push(line);
        }
        lines.push(String::new());
    }
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

/// Rejoin words split across a line break with a trailing hyphen.
fn fix_hyphenation(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '-'
            && i + 1 < chars.len()
            && chars[i + 1] == '\n'
            && i > 0
            && chars[i - 1].is_alphanumeric()
            && chars.get(i + 2).is_some_and(|c| c.is_alphanumeric())
        {
            i += 2;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Replace single newlines that do not follow sentence punctuation with a
/// space, keeping paragraph breaks (blank lines) intact.
fn unwrap_soft_breaks(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &ch) in chars.iter().enumerate() {
        if ch == '\n' {
            let prev = chars[..i].iter().rev().find(|c| **c != ' ' && **c != '\t');
            let next_is_newline = chars.get(i + 1).is_some_and(|c| *c == '\n');
            let prev_is_newline = i > 0 && chars[i - 1] == '\n';
            let sentence_end = prev.is_some_and(|c| matches!(c, '.' | '!' | '?' | ';' | ':'));
            if !next_is_newline && !prev_is_newline && !sentence_end {
                out.push(' ');
                continue;
            }
        }
        out.push(ch);
    }
    out
}

/// Collapse runs of spaces/tabs and trim line edges, keeping newlines.
fn collapse_inline_whitespace(text: &str) -> String {
    let mut paragraph_lines = Vec::new();
    let mut blank_run = 0;
    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            blank_run += 1;
            // Runs of blank lines collapse to a single paragraph break.
            if blank_run == 1 {
                paragraph_lines.push(String::new());
            }
        } else {
            blank_run = 0;
            paragraph_lines.push(collapsed);
        }
    }
    paragraph_lines.join("\n").trim().to_string()
}

/// Greedy word wrap that never breaks inside a word.
fn wrap_paragraph(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in paragraph.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
