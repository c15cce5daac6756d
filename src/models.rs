//! Core data models for tagtrack
//!
//! These structures represent the normalized output format that tagtrack
//! provides to its views and to programmatic consumers: one `Tag` per
//! pattern match occurrence, with enough position information to navigate
//! to it and to splice it back out of its source file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A position in a document (0-indexed line, 0-indexed byte column).
///
/// Columns count bytes from the start of the line, which keeps position
/// arithmetic exact against the raw file content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// One occurrence of a pattern match in a file.
///
/// Tags are produced only by the match extractor and are immutable
/// afterwards. "Deleting" a tag is a text edit on its source file, not a
/// mutation of the tag value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    /// Name of the pattern that produced this tag. A plain key, not an
    /// owning reference; the tag stays valid after the pattern set is
    /// replaced.
    pub pattern: String,
    /// The full matched substring.
    pub raw_text: String,
    /// Substrings of the participating capture groups, in group order.
    pub captures: Vec<String>,
    /// Absolute path of the file the match was found in.
    pub path: PathBuf,
    /// Byte offset of the match start into the file's text.
    pub byte_offset: usize,
    /// Start of the match (inclusive).
    pub start: Position,
    /// End of the match (exclusive).
    pub end: Position,
}

impl Tag {
    /// Text shown for this tag in lists and menus: the capture groups
    /// joined by single spaces when any exist, otherwise the raw match,
    /// trimmed either way.
    pub fn display_text(&self) -> String {
        if self.captures.is_empty() {
            self.raw_text.trim().to_string()
        } else {
            self.captures.join(" ").trim().to_string()
        }
    }

    /// Human-readable location string (1-indexed lines).
    pub fn tooltip(&self) -> String {
        if self.start.line == self.end.line {
            format!("File: {} Line: {}", self.path.display(), self.start.line + 1)
        } else {
            format!("Line: {}-{}", self.start.line + 1, self.end.line + 1)
        }
    }

    /// File basename, used as the secondary label in the tree view.
    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Whether this tag belongs to the given file.
    pub fn is_in_file(&self, path: &Path) -> bool {
        self.path == path
    }
}
